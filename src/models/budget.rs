//! Budget model
//!
//! One monthly target per expense label. Status compares the target against
//! the label's aggregated activity for a month.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::LabelId;
use super::money::Money;

/// A monthly spending target for an expense label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// The label this budget is for
    pub label_id: LabelId,

    /// Target spend per calendar month
    pub monthly_target: Money,

    /// When this budget was last modified
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(label_id: LabelId, monthly_target: Money) -> Self {
        Self {
            label_id,
            monthly_target,
            updated_at: Utc::now(),
        }
    }

    /// Set the target amount
    pub fn set_target(&mut self, amount: Money) {
        self.monthly_target = amount;
        self.updated_at = Utc::now();
    }
}

/// Budget position of a label for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BudgetStatus {
    /// No budget entry exists for the label
    Unbudgeted,
    Budgeted {
        target: Money,
        actual: Money,
        /// `target - actual`; negative means overspent
        remaining: Money,
    },
}

impl BudgetStatus {
    /// Build a budgeted status from target and actual
    pub fn budgeted(target: Money, actual: Money) -> Self {
        Self::Budgeted {
            target,
            actual,
            remaining: target - actual,
        }
    }

    pub fn is_budgeted(&self) -> bool {
        matches!(self, Self::Budgeted { .. })
    }

    /// Check if spending exceeded the target
    pub fn is_overspent(&self) -> bool {
        match self {
            Self::Budgeted { remaining, .. } => remaining.is_negative(),
            Self::Unbudgeted => false,
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbudgeted => write!(f, "unbudgeted"),
            Self::Budgeted {
                target,
                actual,
                remaining,
            } => write!(f, "{} of {} spent, {} remaining", actual, target, remaining),
        }
    }
}
