//! Core data models for labelbook
//!
//! Plain data: transactions from the importer, labels and their match rules,
//! assignments, splits, budgets and the calendar periods used to bucket them.

pub mod assignment;
pub mod budget;
pub mod ids;
pub mod label;
pub mod money;
pub mod period;
pub mod rule;
pub mod split;
pub mod transaction;

pub use assignment::{Assignment, AssignmentSource, Assignments};
pub use budget::{Budget, BudgetStatus};
pub use ids::{AccountId, LabelId, RuleId, SplitId, TransactionId};
pub use label::{Label, LabelType};
pub use money::Money;
pub use period::{DateRange, YearMonth};
pub use rule::{
    AmountBasis, AmountBound, AmountPredicate, DatePredicate, MatchRule, TextMatch, TextPredicate,
};
pub use split::Split;
pub use transaction::{Transaction, TransactionType};
