//! labelbook - rule-based transaction labeling and budget tracking
//!
//! Transactions imported from bank statements are matched against
//! user-defined labels (income, bills, expenses). Labels carry match rules,
//! can be assigned by hand, and expense transactions can be split across
//! several labels. Aggregation turns assignments into monthly series for
//! trends, overviews and budget status.
//!
//! # Architecture
//!
//! - `models`: Core data types (transactions, labels, rules, splits, budgets)
//! - `engine`: Classification, splits, aggregation and budget tracking
//! - `import` / `export`: CSV statement input and report output
//! - `reports`: Trend, monthly overview and budget reports
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `config`: Settings and path management
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use labelbook::config::{LabelbookPaths, Settings};
//! use labelbook::engine::Engine;
//! use labelbook::storage::Storage;
//!
//! let paths = LabelbookPaths::new()?;
//! let storage = Storage::new(paths)?;
//! let engine = Engine::from_snapshot(storage.load()?)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod reports;
pub mod storage;

pub use engine::Engine;
pub use error::{LabelbookError, LabelbookResult};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber once
///
/// Honors `RUST_LOG`; otherwise logs this crate at `info`. Output goes to
/// stderr so it never mixes with command output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("labelbook=info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
