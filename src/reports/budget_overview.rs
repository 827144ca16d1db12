//! Budget Overview Report
//!
//! Status of every budgeted label for a month alongside the month before it.

use crate::engine::Engine;
use crate::error::LabelbookResult;
use crate::models::{BudgetStatus, LabelId, Money, YearMonth};

/// A row in the budget report for a single label
#[derive(Debug, Clone)]
pub struct BudgetReportRow {
    pub label_id: LabelId,
    pub label_name: String,
    pub current: BudgetStatus,
    pub previous: BudgetStatus,
}

impl BudgetReportRow {
    /// Check if this label is overspent this month
    pub fn is_overspent(&self) -> bool {
        self.current.is_overspent()
    }
}

/// Budget Overview Report
#[derive(Debug, Clone)]
pub struct BudgetOverviewReport {
    pub period: YearMonth,
    pub rows: Vec<BudgetReportRow>,
    pub total_target: Money,
    pub total_actual: Money,
}

impl BudgetOverviewReport {
    /// Generate a budget overview report for a month
    pub fn generate(engine: &Engine, period: YearMonth) -> LabelbookResult<Self> {
        let mut rows = Vec::new();
        let mut total_target = Money::zero();
        let mut total_actual = Money::zero();

        for label in engine.labels() {
            if engine.budgets().get(label.id).is_none() {
                continue;
            }

            let current = engine.budget_status(label.id, period)?;
            let previous = engine.budget_status(label.id, period.prev())?;

            if let BudgetStatus::Budgeted { target, actual, .. } = current {
                total_target += target;
                total_actual += actual;
            }

            rows.push(BudgetReportRow {
                label_id: label.id,
                label_name: label.name.clone(),
                current,
                previous,
            });
        }

        Ok(Self {
            period,
            rows,
            total_target,
            total_actual,
        })
    }

    pub fn total_remaining(&self) -> Money {
        self.total_target - self.total_actual
    }

    pub fn has_overspent(&self) -> bool {
        self.rows.iter().any(|r| r.is_overspent())
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Budget Overview: {}\n", self.period.long_name()));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>12} {:>12} {:>12} {:>14}\n",
            "Label", "Target", "Actual", "Remaining", "Last Month"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            let (target, actual, remaining) = match row.current {
                BudgetStatus::Budgeted {
                    target,
                    actual,
                    remaining,
                } => (target, actual, remaining),
                BudgetStatus::Unbudgeted => continue,
            };
            let previous = match row.previous {
                BudgetStatus::Budgeted { actual, .. } => actual.to_string(),
                BudgetStatus::Unbudgeted => "-".to_string(),
            };
            let flag = if remaining.is_negative() { " !" } else { "" };

            output.push_str(&format!(
                "{:<24} {:>12} {:>12} {:>12} {:>14}{}\n",
                row.label_name, target, actual, remaining, previous, flag
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>12} {:>12} {:>12}\n",
            "Total",
            self.total_target,
            self.total_actual,
            self.total_remaining()
        ));

        output
    }
}
