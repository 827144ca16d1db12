//! Split ledger
//!
//! Holds every split and enforces that a transaction's splits never exceed its
//! magnitude. The unsplit remainder is derived on demand and never stored.

use std::collections::BTreeMap;

use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{Assignments, LabelId, Money, Split, SplitId, Transaction, TransactionId};

#[derive(Debug, Clone, Default)]
pub struct SplitLedger {
    splits: BTreeMap<SplitId, Split>,
}

impl SplitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn get(&self, id: SplitId) -> Option<&Split> {
        self.splits.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Split> {
        self.splits.values()
    }

    /// Find a split by full or short display ID
    pub fn find(&self, identifier: &str) -> Option<&Split> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<SplitId>() {
            if let Some(split) = self.splits.get(&id) {
                return Some(split);
            }
        }
        self.splits
            .values()
            .find(|s| s.id.to_string().eq_ignore_ascii_case(identifier))
    }

    /// Splits on a transaction
    pub fn for_transaction<'a>(
        &'a self,
        transaction_id: &TransactionId,
    ) -> impl Iterator<Item = &'a Split> + 'a {
        let transaction_id = transaction_id.clone();
        self.splits
            .values()
            .filter(move |s| s.transaction_id == transaction_id)
    }

    /// Splits on a transaction attributed to one label
    pub fn for_assignment<'a>(
        &'a self,
        transaction_id: &TransactionId,
        label_id: LabelId,
    ) -> impl Iterator<Item = &'a Split> + 'a {
        self.for_transaction(transaction_id)
            .filter(move |s| s.label_id == label_id)
    }

    pub fn has_splits(&self, transaction_id: &TransactionId) -> bool {
        self.for_transaction(transaction_id).next().is_some()
    }

    /// Total already attributed on a transaction
    pub fn allocated(&self, transaction_id: &TransactionId) -> Money {
        self.for_transaction(transaction_id).map(|s| s.amount).sum()
    }

    /// Unattributed part of a transaction's magnitude
    pub fn remainder(&self, txn: &Transaction) -> Money {
        txn.magnitude() - self.allocated(&txn.id)
    }

    /// Check a prospective split against the ledger without recording it
    pub fn check(
        &self,
        txn: &Transaction,
        label_id: LabelId,
        amount: Money,
        assignments: &Assignments,
    ) -> LabelbookResult<()> {
        if !amount.is_positive() {
            return Err(LabelbookError::Validation(format!(
                "Split amount must be positive, got {}",
                amount
            )));
        }

        if !assignments.is_assigned(&txn.id, label_id) {
            return Err(LabelbookError::LabelNotAssigned {
                transaction: txn.id.to_string(),
                label: label_id.to_string(),
            });
        }

        // Compare against what is left so a huge amount cannot overflow the sum
        let allocated = self.allocated(&txn.id);
        if amount > txn.magnitude() - allocated {
            return Err(LabelbookError::OverAllocation {
                transaction: txn.id.to_string(),
                requested: amount,
                allocated,
                total: txn.magnitude(),
            });
        }

        Ok(())
    }

    /// Attribute part of a transaction to an assigned label
    pub fn add_split(
        &mut self,
        txn: &Transaction,
        label_id: LabelId,
        amount: Money,
        assignments: &Assignments,
    ) -> LabelbookResult<SplitId> {
        let split = Split::new(txn.id.clone(), label_id, amount);
        self.insert(txn, split, assignments)
    }

    /// Record a fully-formed split after the same checks as `add_split`
    pub fn insert(
        &mut self,
        txn: &Transaction,
        split: Split,
        assignments: &Assignments,
    ) -> LabelbookResult<SplitId> {
        if split.transaction_id != txn.id {
            return Err(LabelbookError::Validation(format!(
                "Split {} belongs to {}, not {}",
                split.id, split.transaction_id, txn.id
            )));
        }
        if self.splits.contains_key(&split.id) {
            return Err(LabelbookError::Validation(format!(
                "Split {} already exists",
                split.id
            )));
        }
        self.check(txn, split.label_id, split.amount, assignments)?;

        let id = split.id;
        self.splits.insert(id, split);
        Ok(id)
    }

    pub fn remove_split(&mut self, id: SplitId) -> LabelbookResult<Split> {
        self.splits
            .remove(&id)
            .ok_or_else(|| LabelbookError::split_not_found(id.to_string()))
    }

    /// Drop the splits that depended on a (transaction, label) assignment
    pub fn remove_for_assignment(
        &mut self,
        transaction_id: &TransactionId,
        label_id: LabelId,
    ) -> Vec<Split> {
        self.drain_where(|s| &s.transaction_id == transaction_id && s.label_id == label_id)
    }

    /// Drop every split attributed to a label
    pub fn remove_label(&mut self, label_id: LabelId) -> Vec<Split> {
        self.drain_where(|s| s.label_id == label_id)
    }

    fn drain_where(&mut self, predicate: impl Fn(&Split) -> bool) -> Vec<Split> {
        let ids: Vec<SplitId> = self
            .splits
            .values()
            .filter(|s| predicate(*s))
            .map(|s| s.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.splits.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn kroger() -> Transaction {
        Transaction::new(
            "T1",
            "1234",
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            Money::from_cents(-5432),
        )
        .with_payee("KROGER #123")
    }

    fn assigned(txn: &Transaction, labels: &[LabelId]) -> Assignments {
        let mut assignments = Assignments::new();
        for label in labels {
            assignments.add_manual(txn.id.clone(), *label);
        }
        assignments
    }

    #[test]
    fn test_full_split_then_overallocation() {
        let txn = kroger();
        let groceries = LabelId::new();
        let assignments = assigned(&txn, &[groceries]);
        let mut ledger = SplitLedger::new();

        ledger
            .add_split(&txn, groceries, Money::from_cents(5432), &assignments)
            .unwrap();
        assert_eq!(ledger.remainder(&txn), Money::zero());

        let err = ledger
            .add_split(&txn, groceries, Money::from_cents(1), &assignments)
            .unwrap_err();
        assert!(matches!(err, LabelbookError::OverAllocation { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_find_by_display_id() {
        let txn = kroger();
        let groceries = LabelId::new();
        let assignments = assigned(&txn, &[groceries]);
        let mut ledger = SplitLedger::new();
        let id = ledger
            .add_split(&txn, groceries, Money::from_cents(100), &assignments)
            .unwrap();

        assert_eq!(ledger.find(&id.to_string()).unwrap().id, id);
        assert_eq!(ledger.find(&id.as_uuid().to_string()).unwrap().id, id);
        assert!(ledger.find("spl-zzzz").is_none());
    }

    #[test]
    fn test_requires_assignment() {
        let txn = kroger();
        let groceries = LabelId::new();
        let mut ledger = SplitLedger::new();

        let err = ledger
            .add_split(&txn, groceries, Money::from_cents(100), &Assignments::new())
            .unwrap_err();
        assert!(matches!(err, LabelbookError::LabelNotAssigned { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_rejects_zero_and_negative_amounts() {
        let txn = kroger();
        let groceries = LabelId::new();
        let assignments = assigned(&txn, &[groceries]);
        let mut ledger = SplitLedger::new();

        for cents in [0, -100] {
            let err = ledger
                .add_split(&txn, groceries, Money::from_cents(cents), &assignments)
                .unwrap_err();
            assert!(err.is_validation());
        }
    }

    #[test]
    fn test_remainder_and_multiple_splits() {
        let txn = kroger();
        let groceries = LabelId::new();
        let household = LabelId::new();
        let assignments = assigned(&txn, &[groceries, household]);
        let mut ledger = SplitLedger::new();

        ledger
            .add_split(&txn, groceries, Money::from_cents(3000), &assignments)
            .unwrap();
        ledger
            .add_split(&txn, groceries, Money::from_cents(400), &assignments)
            .unwrap();
        ledger
            .add_split(&txn, household, Money::from_cents(1000), &assignments)
            .unwrap();

        assert_eq!(ledger.allocated(&txn.id), Money::from_cents(4400));
        assert_eq!(ledger.remainder(&txn), Money::from_cents(1032));
        assert_eq!(ledger.for_assignment(&txn.id, groceries).count(), 2);

        let removed = ledger.remove_for_assignment(&txn.id, groceries);
        assert_eq!(removed.len(), 2);
        assert_eq!(ledger.remainder(&txn), Money::from_cents(4432));
    }

    #[test]
    fn test_remove_split() {
        let txn = kroger();
        let groceries = LabelId::new();
        let assignments = assigned(&txn, &[groceries]);
        let mut ledger = SplitLedger::new();

        let id = ledger
            .add_split(&txn, groceries, Money::from_cents(100), &assignments)
            .unwrap();
        assert_eq!(ledger.remove_split(id).unwrap().amount.cents(), 100);
        assert!(ledger.remove_split(id).unwrap_err().is_not_found());
        assert!(!ledger.has_splits(&txn.id));
    }

    #[test]
    fn test_inflow_splits_use_magnitude() {
        let refund = Transaction::new(
            "T2",
            "1234",
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            Money::from_cents(2000),
        );
        let groceries = LabelId::new();
        let assignments = assigned(&refund, &[groceries]);
        let mut ledger = SplitLedger::new();

        ledger
            .add_split(&refund, groceries, Money::from_cents(2000), &assignments)
            .unwrap();
        assert!(ledger
            .add_split(&refund, groceries, Money::from_cents(1), &assignments)
            .is_err());
    }

    #[test]
    fn test_near_max_amount_is_overallocation() {
        let txn = kroger();
        let groceries = LabelId::new();
        let assignments = assigned(&txn, &[groceries]);
        let mut ledger = SplitLedger::new();
        ledger
            .add_split(&txn, groceries, Money::from_cents(100), &assignments)
            .unwrap();

        let huge = Money::parse("92233720368547758.07").unwrap();
        let err = ledger
            .add_split(&txn, groceries, huge, &assignments)
            .unwrap_err();

        assert!(matches!(err, LabelbookError::OverAllocation { .. }));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.remainder(&txn), Money::from_cents(5332));
    }

    #[test]
    fn test_splits_for_temporary_id() {
        let txn = kroger();
        let groceries = LabelId::new();
        let assignments = assigned(&txn, &[groceries]);
        let mut ledger = SplitLedger::new();
        ledger
            .add_split(&txn, groceries, Money::from_cents(100), &assignments)
            .unwrap();

        let splits: Vec<&Split> = ledger
            .for_transaction(&TransactionId::new("T1"))
            .collect();
        assert_eq!(splits.len(), 1);
    }
}
