//! Reports module for labelbook
//!
//! Read-only views built on top of the engine: label trends, the monthly
//! income and bill overview, and budget status across labels.

pub mod budget_overview;
pub mod overview;
pub mod trend;

pub use budget_overview::{BudgetOverviewReport, BudgetReportRow};
pub use overview::{MonthlyOverview, OverviewRow};
pub use trend::{TrendReport, TrendStats};
