//! Classification pass
//!
//! Evaluates every label's rules against every transaction. The result is the
//! complete automatic assignment set; callers replace their previous set with
//! it rather than merging.

use std::collections::BTreeSet;

use crate::models::assignment::AssignmentKey;
use crate::models::Transaction;

use super::registry::LabelRegistry;

/// Compute the automatic assignments for a set of transactions
pub fn reclassify<'a, I>(transactions: I, registry: &LabelRegistry) -> BTreeSet<AssignmentKey>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut assigned = BTreeSet::new();

    for txn in transactions {
        for label in registry.iter() {
            if label.matches(txn) {
                assigned.insert((txn.id.clone(), label.id));
            }
        }
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::TextPredicate;
    use crate::models::{Label, LabelType, MatchRule, Money};
    use chrono::NaiveDate;

    fn txn(id: &str, payee: &str) -> Transaction {
        Transaction::new(
            id,
            "1234",
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            Money::from_cents(-5432),
        )
        .with_payee(payee)
    }

    fn registry() -> (LabelRegistry, Label, Label) {
        let groceries = Label::new("Groceries", LabelType::Expense)
            .with_rule(MatchRule::new("kroger").with_payee(TextPredicate::contains("KROGER")));
        let shopping = Label::new("Shopping", LabelType::Expense)
            .with_rule(MatchRule::new("stores").with_payee(TextPredicate::contains("#")));
        let mut registry = LabelRegistry::new();
        registry.insert(groceries.clone()).unwrap();
        registry.insert(shopping.clone()).unwrap();
        (registry, groceries, shopping)
    }

    #[test]
    fn test_transaction_may_carry_several_labels() {
        let (registry, groceries, shopping) = registry();
        let txns = vec![txn("T1", "KROGER #123"), txn("T2", "SHELL OIL")];

        let assigned = reclassify(&txns, &registry);
        assert_eq!(assigned.len(), 2);
        assert!(assigned.contains(&(txns[0].id.clone(), groceries.id)));
        assert!(assigned.contains(&(txns[0].id.clone(), shopping.id)));
    }

    #[test]
    fn test_unmatched_labels_are_never_assigned() {
        let (registry, groceries, _) = registry();
        let txns = vec![txn("T2", "SHELL OIL")];

        let assigned = reclassify(&txns, &registry);
        assert!(!assigned.contains(&(txns[0].id.clone(), groceries.id)));
        assert!(assigned.is_empty());
    }

    #[test]
    fn test_reclassify_is_idempotent() {
        let (registry, _, _) = registry();
        let txns = vec![
            txn("T1", "KROGER #123"),
            txn("T2", "kroger fuel"),
            txn("T3", "SHELL OIL"),
        ];

        let first = reclassify(&txns, &registry);
        let second = reclassify(&txns, &registry);
        assert_eq!(first, second);
    }

    #[test]
    fn test_label_without_rules_assigns_nothing() {
        let mut registry = LabelRegistry::new();
        registry.insert(Label::new("Misc", LabelType::Expense)).unwrap();
        assert!(reclassify(&[txn("T1", "anything")], &registry).is_empty());
    }
}
