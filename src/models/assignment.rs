//! Label assignments
//!
//! Automatic and manual assignments are kept in separate sets. The automatic
//! set is only ever replaced wholesale by a classification pass; the manual
//! set is edited one pair at a time and survives rule changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ids::{LabelId, TransactionId};

/// Where an assignment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Automatic,
    Manual,
}

impl fmt::Display for AssignmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A link between a transaction and a label
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub transaction_id: TransactionId,
    pub label_id: LabelId,
    pub source: AssignmentSource,
}

impl Assignment {
    pub fn manual(transaction_id: TransactionId, label_id: LabelId) -> Self {
        Self {
            transaction_id,
            label_id,
            source: AssignmentSource::Manual,
        }
    }

    pub fn automatic(transaction_id: TransactionId, label_id: LabelId) -> Self {
        Self {
            transaction_id,
            label_id,
            source: AssignmentSource::Automatic,
        }
    }
}

pub type AssignmentKey = (TransactionId, LabelId);

/// Every current assignment, split by source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    automatic: BTreeSet<AssignmentKey>,
    manual: BTreeSet<AssignmentKey>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// The automatic assignment set
    pub fn automatic(&self) -> &BTreeSet<AssignmentKey> {
        &self.automatic
    }

    /// The manual assignment set
    pub fn manual(&self) -> &BTreeSet<AssignmentKey> {
        &self.manual
    }

    /// Replace the automatic set, returning the pairs that were dropped
    pub fn replace_automatic(&mut self, next: BTreeSet<AssignmentKey>) -> Vec<AssignmentKey> {
        let dropped = self.automatic.difference(&next).cloned().collect();
        self.automatic = next;
        dropped
    }

    /// Record a manual assignment; returns false if it already existed
    pub fn add_manual(&mut self, transaction_id: TransactionId, label_id: LabelId) -> bool {
        self.manual.insert((transaction_id, label_id))
    }

    /// Remove a manual assignment; returns false if there was none
    pub fn remove_manual(&mut self, transaction_id: &TransactionId, label_id: LabelId) -> bool {
        self.manual.remove(&(transaction_id.clone(), label_id))
    }

    /// Check if the label is assigned to the transaction by either source
    pub fn is_assigned(&self, transaction_id: &TransactionId, label_id: LabelId) -> bool {
        let key = (transaction_id.clone(), label_id);
        self.automatic.contains(&key) || self.manual.contains(&key)
    }

    pub fn is_manual(&self, transaction_id: &TransactionId, label_id: LabelId) -> bool {
        self.manual.contains(&(transaction_id.clone(), label_id))
    }

    pub fn is_automatic(&self, transaction_id: &TransactionId, label_id: LabelId) -> bool {
        self.automatic.contains(&(transaction_id.clone(), label_id))
    }

    /// Labels assigned to a transaction by either source
    pub fn labels_for(&self, transaction_id: &TransactionId) -> BTreeSet<LabelId> {
        self.automatic
            .iter()
            .chain(self.manual.iter())
            .filter(|(t, _)| t == transaction_id)
            .map(|(_, l)| *l)
            .collect()
    }

    /// Transactions a label is assigned to by either source
    pub fn transactions_for(&self, label_id: LabelId) -> BTreeSet<TransactionId> {
        self.automatic
            .iter()
            .chain(self.manual.iter())
            .filter(|(_, l)| *l == label_id)
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Tagged assignments for a transaction; a pair held by both sources appears twice
    pub fn for_transaction(&self, transaction_id: &TransactionId) -> Vec<Assignment> {
        let auto = self
            .automatic
            .iter()
            .filter(|(t, _)| t == transaction_id)
            .map(|(t, l)| Assignment::automatic(t.clone(), *l));
        let manual = self
            .manual
            .iter()
            .filter(|(t, _)| t == transaction_id)
            .map(|(t, l)| Assignment::manual(t.clone(), *l));
        auto.chain(manual).collect()
    }

    /// Manual assignments as plain records
    pub fn manual_records(&self) -> Vec<Assignment> {
        self.manual
            .iter()
            .map(|(t, l)| Assignment::manual(t.clone(), *l))
            .collect()
    }

    /// Drop every assignment of a label, from both sources
    pub fn remove_label(&mut self, label_id: LabelId) -> usize {
        let before = self.automatic.len() + self.manual.len();
        self.automatic.retain(|(_, l)| *l != label_id);
        self.manual.retain(|(_, l)| *l != label_id);
        before - self.automatic.len() - self.manual.len()
    }

    pub fn references_label(&self, label_id: LabelId) -> bool {
        self.automatic
            .iter()
            .chain(self.manual.iter())
            .any(|(_, l)| *l == label_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TransactionId {
        TransactionId::new(s)
    }

    #[test]
    fn test_replace_automatic_is_full_replace() {
        let groceries = LabelId::new();
        let shopping = LabelId::new();
        let mut assignments = Assignments::new();

        assignments.replace_automatic(
            [(tid("T1"), groceries), (tid("T1"), shopping)].into_iter().collect(),
        );
        let dropped = assignments.replace_automatic([(tid("T1"), shopping)].into_iter().collect());

        assert_eq!(dropped, vec![(tid("T1"), groceries)]);
        assert!(!assignments.is_assigned(&tid("T1"), groceries));
        assert!(assignments.is_assigned(&tid("T1"), shopping));
    }

    #[test]
    fn test_manual_survives_automatic_replace() {
        let label = LabelId::new();
        let mut assignments = Assignments::new();
        assert!(assignments.add_manual(tid("T1"), label));
        assert!(!assignments.add_manual(tid("T1"), label));

        assignments.replace_automatic(BTreeSet::new());
        assert!(assignments.is_assigned(&tid("T1"), label));
        assert!(assignments.is_manual(&tid("T1"), label));
        assert!(!assignments.is_automatic(&tid("T1"), label));
    }

    #[test]
    fn test_pair_held_by_both_sources() {
        let label = LabelId::new();
        let mut assignments = Assignments::new();
        assignments.add_manual(tid("T1"), label);
        assignments.replace_automatic([(tid("T1"), label)].into_iter().collect());

        assert_eq!(assignments.for_transaction(&tid("T1")).len(), 2);
        assert_eq!(assignments.labels_for(&tid("T1")).len(), 1);

        assert!(assignments.remove_manual(&tid("T1"), label));
        assert!(assignments.is_assigned(&tid("T1"), label));
    }

    #[test]
    fn test_remove_label_clears_both_sources() {
        let label = LabelId::new();
        let other = LabelId::new();
        let mut assignments = Assignments::new();
        assignments.add_manual(tid("T1"), label);
        assignments.add_manual(tid("T2"), other);
        assignments.replace_automatic([(tid("T2"), label)].into_iter().collect());

        assert_eq!(assignments.remove_label(label), 2);
        assert!(!assignments.references_label(label));
        assert!(assignments.references_label(other));
        assert_eq!(assignments.transactions_for(other), BTreeSet::from([tid("T2")]));
    }
}
