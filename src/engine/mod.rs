//! Classification engine
//!
//! `Engine` owns every collection: transactions, the label registry,
//! assignments, splits and budgets. All mutation goes through it so that
//! automatic assignments are recomputed synchronously after any change to the
//! registry or the transaction set, and the bucket cache is dropped after any
//! change at all.
//!
//! The engine performs no I/O. State enters through [`Engine::from_snapshot`]
//! and [`Engine::import_transactions`] and leaves through [`Engine::snapshot`].

pub mod aggregate;
pub mod budget;
pub mod classifier;
pub mod registry;
pub mod splits;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{
    AccountId, Assignment, Assignments, Budget, BudgetStatus, DateRange, Label, LabelId,
    LabelType, MatchRule, Money, RuleId, Split, SplitId, Transaction, TransactionId, YearMonth,
};

pub use aggregate::{Contribution, MonthlyAmount, PeriodBuckets};
pub use budget::BudgetTracker;
pub use registry::{LabelRegistry, LabelUpdate};
pub use splits::SplitLedger;

/// Plain-data form of everything the engine does not derive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub manual_assignments: Vec<Assignment>,
    #[serde(default)]
    pub splits: Vec<Split>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
}

/// Outcome of feeding importer records to the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: Vec<TransactionId>,
    pub duplicates: Vec<TransactionId>,
}

impl ImportReport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    transactions: BTreeMap<TransactionId, Transaction>,
    registry: LabelRegistry,
    assignments: Assignments,
    ledger: SplitLedger,
    budgets: BudgetTracker,
    buckets: RefCell<PeriodBuckets>,
    recompute_count: u64,
}

impl Engine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from persisted state
    ///
    /// Labels load first, then transactions, then one classification pass,
    /// then manual assignments, splits and budgets, each checked against what
    /// came before it.
    pub fn from_snapshot(snapshot: Snapshot) -> LabelbookResult<Self> {
        let mut engine = Self::new();

        for label in snapshot.labels {
            engine.registry.insert(label)?;
        }

        for txn in snapshot.transactions {
            if engine.transactions.contains_key(&txn.id) {
                warn!(transaction = %txn.id, "Skipping duplicate transaction in snapshot");
                continue;
            }
            engine.transactions.insert(txn.id.clone(), txn);
        }

        for assignment in snapshot.manual_assignments {
            engine.require_transaction(&assignment.transaction_id)?;
            engine.registry.require(assignment.label_id)?;
            engine
                .assignments
                .add_manual(assignment.transaction_id, assignment.label_id);
        }

        engine.reclassify();

        for split in snapshot.splits {
            engine.registry.require(split.label_id)?;
            let txn = engine.transactions.get(&split.transaction_id).ok_or_else(|| {
                LabelbookError::transaction_not_found(split.transaction_id.to_string())
            })?;
            engine.ledger.insert(txn, split, &engine.assignments)?;
        }

        for budget in snapshot.budgets {
            let label = engine.registry.require(budget.label_id)?;
            engine.budgets.insert(label, budget)?;
        }

        info!(
            transactions = engine.transactions.len(),
            labels = engine.registry.len(),
            splits = engine.ledger.len(),
            "Loaded engine state"
        );
        Ok(engine)
    }

    /// Export non-derived state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            transactions: self.transactions().into_iter().cloned().collect(),
            labels: self.registry.list().into_iter().cloned().collect(),
            manual_assignments: self.assignments.manual_records(),
            splits: self.ledger.iter().cloned().collect(),
            budgets: self.budgets.iter().cloned().collect(),
        }
    }

    /// Number of full classification passes run so far
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Replace automatic assignments with a fresh pass over every transaction
    fn reclassify(&mut self) {
        let next = classifier::reclassify(self.transactions.values(), &self.registry);
        let automatic = next.len();
        let dropped = self.assignments.replace_automatic(next);

        let mut cascaded = 0;
        for (transaction_id, label_id) in dropped {
            if !self.assignments.is_assigned(&transaction_id, label_id) {
                cascaded += self
                    .ledger
                    .remove_for_assignment(&transaction_id, label_id)
                    .len();
            }
        }

        self.recompute_count += 1;
        self.invalidate();
        debug!(
            automatic,
            manual = self.assignments.manual().len(),
            cascaded_splits = cascaded,
            pass = self.recompute_count,
            "Reclassified transactions"
        );
    }

    fn invalidate(&mut self) {
        self.buckets.get_mut().clear();
    }

    // === Transactions ===

    /// Add importer records, skipping ids the engine already holds
    pub fn import_transactions<I>(&mut self, records: I) -> ImportReport
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut report = ImportReport::default();

        for txn in records {
            if self.transactions.contains_key(&txn.id) {
                warn!(transaction = %txn.id, "Skipping duplicate transaction");
                report.duplicates.push(txn.id);
                continue;
            }
            report.added.push(txn.id.clone());
            self.transactions.insert(txn.id.clone(), txn);
        }

        if !report.added.is_empty() {
            self.reclassify();
        }

        info!(
            added = report.added.len(),
            duplicates = report.duplicates.len(),
            "Imported transactions"
        );
        report
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.get(id)
    }

    fn require_transaction(&self, id: &TransactionId) -> LabelbookResult<&Transaction> {
        self.transactions
            .get(id)
            .ok_or_else(|| LabelbookError::transaction_not_found(id.to_string()))
    }

    /// All transactions ordered by date, then id
    pub fn transactions(&self) -> Vec<&Transaction> {
        let mut txns: Vec<&Transaction> = self.transactions.values().collect();
        txns.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        txns
    }

    pub fn transactions_for_account(&self, account: &AccountId) -> Vec<&Transaction> {
        self.transactions()
            .into_iter()
            .filter(|t| &t.account_id == account)
            .collect()
    }

    pub fn transactions_in_year(&self, account: &AccountId, year: i32) -> Vec<&Transaction> {
        self.transactions_for_account(account)
            .into_iter()
            .filter(|t| YearMonth::from_date(t.date).year == year)
            .collect()
    }

    pub fn transactions_in_month(
        &self,
        account: &AccountId,
        year: i32,
        month: u32,
    ) -> LabelbookResult<Vec<&Transaction>> {
        let period = YearMonth::new(year, month)
            .map_err(|e| LabelbookError::Validation(e.to_string()))?;
        Ok(self
            .transactions_for_account(account)
            .into_iter()
            .filter(|t| YearMonth::from_date(t.date) == period)
            .collect())
    }

    /// Transactions carrying a label from either source
    pub fn transactions_with_label(&self, label_id: LabelId) -> LabelbookResult<Vec<&Transaction>> {
        self.registry.require(label_id)?;
        let ids = self.assignments.transactions_for(label_id);
        Ok(self
            .transactions()
            .into_iter()
            .filter(|t| ids.contains(&t.id))
            .collect())
    }

    /// Years and months that have at least one transaction
    pub fn months_with_activity(
        &self,
        account: Option<&AccountId>,
    ) -> BTreeMap<i32, BTreeSet<u32>> {
        let mut months: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
        for txn in self.transactions.values() {
            if account.is_some_and(|a| a != &txn.account_id) {
                continue;
            }
            let period = YearMonth::from_date(txn.date);
            months.entry(period.year).or_default().insert(period.month);
        }
        months
    }

    /// Distinct accounts, ordered
    pub fn accounts(&self) -> BTreeSet<&AccountId> {
        self.transactions.values().map(|t| &t.account_id).collect()
    }

    // === Labels ===

    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.registry.get(id)
    }

    /// Find a label by name or ID string
    pub fn find_label(&self, identifier: &str) -> LabelbookResult<&Label> {
        self.registry
            .find(identifier)
            .ok_or_else(|| LabelbookError::label_not_found(identifier))
    }

    pub fn labels(&self) -> Vec<&Label> {
        self.registry.list()
    }

    /// Register a label (with any rules it carries)
    pub fn create_label(&mut self, label: Label) -> LabelbookResult<LabelId> {
        let id = self.registry.insert(label)?;
        self.reclassify();
        if let Some(label) = self.registry.get(id) {
            info!(label = %label.name, id = %id, "Created label");
        }
        Ok(id)
    }

    pub fn rename_label(&mut self, id: LabelId, name: &str) -> LabelbookResult<()> {
        self.update_label(
            id,
            LabelUpdate {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    /// Change a label's fields
    ///
    /// A label that has a budget cannot change to a non-expense type.
    pub fn update_label(&mut self, id: LabelId, update: LabelUpdate) -> LabelbookResult<()> {
        if let Some(label_type) = update.label_type {
            if !label_type.is_expense() && self.budgets.get(id).is_some() {
                let name = self.registry.require(id)?.name.clone();
                return Err(LabelbookError::InvalidLabelType(format!(
                    "'{}' has a budget and must stay an expense label",
                    name
                )));
            }
        }

        self.registry.update(id, update)?;
        self.reclassify();
        Ok(())
    }

    /// Delete a label and everything that references it
    pub fn delete_label(&mut self, id: LabelId) -> LabelbookResult<Label> {
        let label = self.registry.remove(id)?;

        let assignments = self.assignments.remove_label(id);
        let splits = self.ledger.remove_label(id).len();
        let budget = self.budgets.remove_budget(id).is_some();
        self.reclassify();

        info!(
            label = %label.name,
            assignments,
            splits,
            budget,
            "Deleted label"
        );
        Ok(label)
    }

    /// Append a match rule to a label
    pub fn add_rule(&mut self, label_id: LabelId, rule: MatchRule) -> LabelbookResult<RuleId> {
        let rule_id = self.registry.add_rule(label_id, rule)?;
        self.reclassify();
        Ok(rule_id)
    }

    /// Remove a match rule from a label
    pub fn remove_rule(&mut self, label_id: LabelId, rule_id: RuleId) -> LabelbookResult<MatchRule> {
        let rule = self.registry.remove_rule(label_id, rule_id)?;
        self.reclassify();
        Ok(rule)
    }

    /// Remove a match rule from whichever label owns it
    pub fn remove_rule_by_id(&mut self, rule_id: RuleId) -> LabelbookResult<(LabelId, MatchRule)> {
        let label_id = self
            .registry
            .rule_owner(rule_id)
            .map(|l| l.id)
            .ok_or_else(|| LabelbookError::rule_not_found(rule_id.to_string()))?;
        let rule = self.remove_rule(label_id, rule_id)?;
        Ok((label_id, rule))
    }

    // === Assignments ===

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    /// Tagged assignments on a transaction
    pub fn assignments_for(&self, transaction_id: &TransactionId) -> Vec<Assignment> {
        self.assignments.for_transaction(transaction_id)
    }

    /// Labels on a transaction, ordered by name
    pub fn labels_for(&self, transaction_id: &TransactionId) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self
            .assignments
            .labels_for(transaction_id)
            .into_iter()
            .filter_map(|id| self.registry.get(id))
            .collect();
        labels.sort_by_key(|l| l.name.to_lowercase());
        labels
    }

    /// Assign a label by hand; returns false if it was already manually assigned
    pub fn assign_label(
        &mut self,
        transaction_id: &TransactionId,
        label_id: LabelId,
    ) -> LabelbookResult<bool> {
        self.require_transaction(transaction_id)?;
        self.registry.require(label_id)?;

        let added = self.assignments.add_manual(transaction_id.clone(), label_id);
        if added {
            self.invalidate();
        }
        Ok(added)
    }

    /// Remove a manual assignment
    ///
    /// Splits on the pair are dropped when no automatic assignment keeps the
    /// label on the transaction. Returns the dropped splits.
    pub fn unassign_label(
        &mut self,
        transaction_id: &TransactionId,
        label_id: LabelId,
    ) -> LabelbookResult<Vec<Split>> {
        self.require_transaction(transaction_id)?;
        let label = self.registry.require(label_id)?;

        if !self.assignments.is_manual(transaction_id, label_id) {
            if self.assignments.is_automatic(transaction_id, label_id) {
                return Err(LabelbookError::Validation(format!(
                    "'{}' is assigned to {} by a rule; change the label's rules instead",
                    label.name, transaction_id
                )));
            }
            return Err(LabelbookError::LabelNotAssigned {
                transaction: transaction_id.to_string(),
                label: label.name.clone(),
            });
        }

        self.assignments.remove_manual(transaction_id, label_id);
        let dropped = if self.assignments.is_assigned(transaction_id, label_id) {
            Vec::new()
        } else {
            self.ledger.remove_for_assignment(transaction_id, label_id)
        };
        self.invalidate();
        Ok(dropped)
    }

    /// Payee to show for a transaction
    ///
    /// The alias of the first assigned label (by name) that has one, else the
    /// raw payee.
    pub fn display_payee(&self, txn: &Transaction) -> String {
        self.labels_for(&txn.id)
            .into_iter()
            .find_map(|l| l.alias.clone())
            .unwrap_or_else(|| txn.payee.clone())
    }

    // === Splits ===

    pub fn ledger(&self) -> &SplitLedger {
        &self.ledger
    }

    /// Attribute part of a transaction to one of its labels
    pub fn add_split(
        &mut self,
        transaction_id: &TransactionId,
        label_id: LabelId,
        amount: Money,
    ) -> LabelbookResult<SplitId> {
        self.registry.require(label_id)?;
        let txn = self
            .transactions
            .get(transaction_id)
            .ok_or_else(|| LabelbookError::transaction_not_found(transaction_id.to_string()))?;

        let id = self
            .ledger
            .add_split(txn, label_id, amount, &self.assignments)?;
        self.invalidate();
        Ok(id)
    }

    pub fn remove_split(&mut self, id: SplitId) -> LabelbookResult<Split> {
        let split = self.ledger.remove_split(id)?;
        self.invalidate();
        Ok(split)
    }

    pub fn splits_for(&self, transaction_id: &TransactionId) -> Vec<&Split> {
        self.ledger.for_transaction(transaction_id).collect()
    }

    /// Unattributed part of a transaction's magnitude
    pub fn remainder(&self, transaction_id: &TransactionId) -> LabelbookResult<Money> {
        let txn = self.require_transaction(transaction_id)?;
        Ok(self.ledger.remainder(txn))
    }

    // === Aggregation ===

    /// Monthly series for a label, one entry per month in the range
    pub fn aggregate(&self, label_id: LabelId, range: DateRange) -> LabelbookResult<Vec<MonthlyAmount>> {
        let label = self.registry.require(label_id)?;

        if aggregate::covers_whole_months(&range) {
            let mut cache = self.buckets.borrow_mut();
            let buckets = cache.get_or_build(label_id, || self.build_buckets(label));
            return Ok(aggregate::fill_series(buckets, range));
        }

        Ok(aggregate::aggregate(
            &self.transactions,
            &self.ledger,
            &self.assignments,
            label,
            range,
        ))
    }

    /// Aggregated amount for a label in one month
    pub fn period_total(&self, label_id: LabelId, period: YearMonth) -> LabelbookResult<Money> {
        Ok(self
            .aggregate(label_id, period.range())?
            .first()
            .map(|m| m.amount)
            .unwrap_or_default())
    }

    /// Every contribution to a label, ordered by date
    pub fn contributions(&self, label_id: LabelId) -> LabelbookResult<Vec<Contribution>> {
        let label = self.registry.require(label_id)?;
        Ok(aggregate::contributions(
            &self.transactions,
            &self.ledger,
            &self.assignments,
            label,
        ))
    }

    fn build_buckets(&self, label: &Label) -> BTreeMap<YearMonth, Money> {
        let all = aggregate::contributions(&self.transactions, &self.ledger, &self.assignments, label);
        aggregate::bucket_by_month(&all)
    }

    // === Budgets ===

    pub fn budgets(&self) -> &BudgetTracker {
        &self.budgets
    }

    /// Set the monthly target for an expense label
    pub fn set_budget(&mut self, label_id: LabelId, target: Money) -> LabelbookResult<()> {
        let label = self.registry.require(label_id)?;
        self.budgets.set_budget(label, target)?;
        Ok(())
    }

    pub fn remove_budget(&mut self, label_id: LabelId) -> LabelbookResult<Budget> {
        let label = self.registry.require(label_id)?;
        self.budgets.remove_budget(label_id).ok_or_else(|| LabelbookError::UnknownReference {
            entity_type: "Budget",
            identifier: label.name.clone(),
        })
    }

    /// Target, actual and remaining for a label in one month
    pub fn budget_status(&self, label_id: LabelId, period: YearMonth) -> LabelbookResult<BudgetStatus> {
        let actual = self.period_total(label_id, period)?;
        Ok(self.budgets.status(label_id, actual))
    }

    /// Labels of one type, ordered by name
    pub fn labels_of_type(&self, label_type: LabelType) -> Vec<&Label> {
        self.registry
            .list()
            .into_iter()
            .filter(|l| l.label_type == label_type)
            .collect()
    }
}
