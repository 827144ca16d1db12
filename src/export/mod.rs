//! Export module for labelbook
//!
//! CSV output of trend series and per-label transaction lists.

pub mod csv;

pub use self::csv::{export_label_transactions_csv, export_series_csv};
