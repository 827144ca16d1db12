//! Audit logging for labelbook
//!
//! Every user-initiated change to labels, rules, manual assignments, splits
//! and budgets is appended to a line-delimited JSON log with before/after
//! values. Automatic assignments are derived state and are not audited.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::{AuditLogger, AuditQuery};
