//! Split model
//!
//! A split attributes part of a transaction's magnitude to one of the labels
//! assigned to it. Amounts are stored as positive magnitudes regardless of the
//! parent transaction's sign.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{LabelId, SplitId, TransactionId};
use super::money::Money;

/// A portion of a transaction attributed to a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub id: SplitId,

    /// The transaction being split
    pub transaction_id: TransactionId,

    /// The label this portion is attributed to
    pub label_id: LabelId,

    /// Attributed magnitude (always positive)
    pub amount: Money,

    #[serde(default)]
    pub memo: String,
}

impl Split {
    /// Create a new split
    pub fn new(transaction_id: TransactionId, label_id: LabelId, amount: Money) -> Self {
        Self {
            id: SplitId::new(),
            transaction_id,
            label_id,
            amount,
            memo: String::new(),
        }
    }

    /// Create a new split with a memo
    pub fn with_memo(
        transaction_id: TransactionId,
        label_id: LabelId,
        amount: Money,
        memo: impl Into<String>,
    ) -> Self {
        Self {
            memo: memo.into(),
            ..Self::new(transaction_id, label_id, amount)
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} of {}", self.id, self.amount, self.transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_split() {
        let label = LabelId::new();
        let split = Split::with_memo(
            TransactionId::new("T1"),
            label,
            Money::from_cents(2000),
            "household",
        );
        assert_eq!(split.label_id, label);
        assert_eq!(split.amount.cents(), 2000);
        assert_eq!(split.memo, "household");
        assert!(split.to_string().ends_with("$20.00 of T1"));
    }
}
