//! Period aggregation
//!
//! Turns assigned transactions and splits into per-month totals for a label.
//! Amounts are oriented to the label's type: spending counts positive for
//! expense and bill labels, receipts count positive for income labels.
//!
//! An expense label on a transaction that carries any splits only receives
//! the splits attributed to it. Income and bill labels always take the full
//! transaction amount. The unsplit remainder is never attributed anywhere.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    Assignments, DateRange, Label, LabelId, LabelType, Money, Transaction, TransactionId,
    YearMonth,
};

use super::splits::SplitLedger;

/// One month of a label's series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyAmount {
    pub period: YearMonth,
    pub amount: Money,
}

/// What a single transaction adds to a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub transaction_id: TransactionId,
    pub date: NaiveDate,
    pub amount: Money,
}

/// Amount a transaction contributes to a label it is assigned to
///
/// Returns `None` when the transaction is split but none of its splits name
/// this (expense) label.
pub fn contribution(label: &Label, txn: &Transaction, ledger: &SplitLedger) -> Option<Money> {
    match label.label_type {
        LabelType::Income => Some(txn.amount),
        LabelType::Bill => Some(-txn.amount),
        LabelType::Expense if ledger.has_splits(&txn.id) => {
            let mut splits = ledger.for_assignment(&txn.id, label.id).peekable();
            splits.peek()?;
            let total: Money = splits.map(|s| s.amount).sum();
            Some(if txn.is_inflow() { -total } else { total })
        }
        LabelType::Expense => Some(-txn.amount),
    }
}

/// Every contribution to a label, ordered by date then transaction id
pub fn contributions(
    transactions: &BTreeMap<TransactionId, Transaction>,
    ledger: &SplitLedger,
    assignments: &Assignments,
    label: &Label,
) -> Vec<Contribution> {
    let mut found: Vec<Contribution> = assignments
        .transactions_for(label.id)
        .iter()
        .filter_map(|id| transactions.get(id))
        .filter_map(|txn| {
            contribution(label, txn, ledger).map(|amount| Contribution {
                transaction_id: txn.id.clone(),
                date: txn.date,
                amount,
            })
        })
        .collect();
    found.sort_by(|a, b| (a.date, &a.transaction_id).cmp(&(b.date, &b.transaction_id)));
    found
}

/// Sum contributions into calendar-month buckets
pub fn bucket_by_month<'a, I>(contributions: I) -> BTreeMap<YearMonth, Money>
where
    I: IntoIterator<Item = &'a Contribution>,
{
    let mut buckets = BTreeMap::new();
    for c in contributions {
        *buckets
            .entry(YearMonth::from_date(c.date))
            .or_insert_with(Money::zero) += c.amount;
    }
    buckets
}

/// Lay buckets out over every month of a range, zero-filling gaps
pub fn fill_series(buckets: &BTreeMap<YearMonth, Money>, range: DateRange) -> Vec<MonthlyAmount> {
    range
        .year_months()
        .into_iter()
        .map(|period| MonthlyAmount {
            period,
            amount: buckets.get(&period).copied().unwrap_or_default(),
        })
        .collect()
}

/// Monthly series for a label over a date range
///
/// Only transactions dated inside the range count. The result has exactly one
/// entry per calendar month the range touches, ascending.
pub fn aggregate(
    transactions: &BTreeMap<TransactionId, Transaction>,
    ledger: &SplitLedger,
    assignments: &Assignments,
    label: &Label,
    range: DateRange,
) -> Vec<MonthlyAmount> {
    let all = contributions(transactions, ledger, assignments, label);
    let buckets = bucket_by_month(all.iter().filter(|c| range.contains(c.date)));
    fill_series(&buckets, range)
}

/// Check if a range starts and ends on month boundaries
pub fn covers_whole_months(range: &DateRange) -> bool {
    range.start == YearMonth::from_date(range.start).start_date()
        && range.end == YearMonth::from_date(range.end).end_date()
}

/// Cache of whole-month buckets per label
///
/// Derived data only. The owner clears it on every mutation of transactions,
/// labels, assignments or splits.
#[derive(Debug, Default)]
pub struct PeriodBuckets {
    by_label: HashMap<LabelId, BTreeMap<YearMonth, Money>>,
}

impl PeriodBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cached(&self, label_id: LabelId) -> bool {
        self.by_label.contains_key(&label_id)
    }

    /// Cached buckets for a label, building them on first use
    pub fn get_or_build(
        &mut self,
        label_id: LabelId,
        build: impl FnOnce() -> BTreeMap<YearMonth, Money>,
    ) -> &BTreeMap<YearMonth, Money> {
        self.by_label.entry(label_id).or_insert_with(build)
    }

    pub fn clear(&mut self) {
        self.by_label.clear();
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}
