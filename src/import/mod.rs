//! Statement import boundary
//!
//! Reads normalized statement records and hands them to the engine, which
//! skips ids it already knows.

pub mod csv;

pub use self::csv::{import_csv, parse_statement, ImportSummary, ParsedStatement, StatementRow};
