//! Budget tracker
//!
//! Stores one monthly target per expense label and turns aggregated actuals
//! into a status.

use std::collections::BTreeMap;

use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{Budget, BudgetStatus, Label, LabelId, Money};

#[derive(Debug, Clone, Default)]
pub struct BudgetTracker {
    budgets: BTreeMap<LabelId, Budget>,
}

impl BudgetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label_id: LabelId) -> Option<&Budget> {
        self.budgets.get(&label_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Budget> {
        self.budgets.values()
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    /// Set (or replace) the monthly target for an expense label
    pub fn set_budget(&mut self, label: &Label, target: Money) -> LabelbookResult<&Budget> {
        Self::check(label, target)?;

        let budget = self
            .budgets
            .entry(label.id)
            .and_modify(|b| b.set_target(target))
            .or_insert_with(|| Budget::new(label.id, target));
        Ok(budget)
    }

    /// Record a loaded budget after the same checks as `set_budget`
    pub fn insert(&mut self, label: &Label, budget: Budget) -> LabelbookResult<()> {
        Self::check(label, budget.monthly_target)?;
        self.budgets.insert(label.id, budget);
        Ok(())
    }

    /// Remove a label's budget, if any
    pub fn remove_budget(&mut self, label_id: LabelId) -> Option<Budget> {
        self.budgets.remove(&label_id)
    }

    /// Compare a label's target against its actual for one month
    pub fn status(&self, label_id: LabelId, actual: Money) -> BudgetStatus {
        match self.budgets.get(&label_id) {
            Some(budget) => BudgetStatus::budgeted(budget.monthly_target, actual),
            None => BudgetStatus::Unbudgeted,
        }
    }

    fn check(label: &Label, target: Money) -> LabelbookResult<()> {
        if !label.label_type.is_expense() {
            return Err(LabelbookError::InvalidLabelType(format!(
                "'{}' is a {} label; only expense labels can be budgeted",
                label.name, label.label_type
            )));
        }
        if target.is_negative() {
            return Err(LabelbookError::Validation(format!(
                "Budget target cannot be negative, got {}",
                target
            )));
        }
        Ok(())
    }
}
