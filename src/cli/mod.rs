//! CLI command handlers
//!
//! Bridges clap argument parsing with the engine. Every handler works on a
//! [`Workspace`], which owns the loaded engine and persists it (and appends
//! to the audit log) once a command has changed something.

pub mod budget;
pub mod config;
pub mod label;
pub mod report;
pub mod rule;
pub mod split;
pub mod transaction;

pub use budget::{handle_budget_command, BudgetCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use label::{handle_label_command, LabelCommands};
pub use report::{handle_report_command, ReportCommands};
pub use rule::{handle_rule_command, RuleCommands};
pub use split::{handle_split_command, SplitCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;
use tracing::debug;

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::{LabelbookPaths, Settings};
use crate::engine::Engine;
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{Money, Transaction, TransactionId, YearMonth};
use crate::storage::Storage;

/// Loaded state for one CLI invocation
pub struct Workspace {
    pub paths: LabelbookPaths,
    pub settings: Settings,
    pub engine: Engine,
    storage: Storage,
    audit: AuditLogger,
    pending: Vec<AuditEntry>,
}

impl Workspace {
    /// Load settings and engine state from disk
    pub fn open(paths: LabelbookPaths) -> LabelbookResult<Self> {
        let settings = Settings::load_or_create(&paths)?;
        let storage = Storage::new(paths.clone())?;
        let engine = Engine::from_snapshot(storage.load()?)?;
        let audit = AuditLogger::new(paths.audit_log());

        Ok(Self {
            paths,
            settings,
            engine,
            storage,
            audit,
            pending: Vec::new(),
        })
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Queue an audit entry; the state is saved and the entry written on commit
    pub fn record(&mut self, entry: AuditEntry) {
        self.pending.push(entry);
    }

    /// Persist engine state, then the audit entries describing it
    ///
    /// Nothing is written when no change was recorded. If saving fails the
    /// queued entries are kept back, so the log never describes unsaved state.
    pub fn commit(&mut self) -> LabelbookResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.storage.save(&self.engine.snapshot())?;
        debug!(dir = %self.paths.data_dir().display(), "Saved engine state");

        let entries = std::mem::take(&mut self.pending);
        self.audit.append(&entries)
    }

    /// Look up a transaction by its importer ID
    pub fn transaction(&self, id: &str) -> LabelbookResult<&Transaction> {
        self.engine
            .transaction(&TransactionId::new(id.trim()))
            .ok_or_else(|| LabelbookError::transaction_not_found(id))
    }
}

/// Parse a money amount from user input
pub fn parse_money(input: &str) -> LabelbookResult<Money> {
    Money::parse(input)
        .map_err(|e| LabelbookError::Validation(format!("Invalid amount '{}': {}", input, e)))
}

/// Parse a YYYY-MM-DD date from user input
pub fn parse_date(input: &str) -> LabelbookResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        LabelbookError::Validation(format!("Invalid date '{}' (expected YYYY-MM-DD)", input))
    })
}

/// Parse a YYYY-MM month, defaulting to the current month
pub fn parse_month(input: Option<&str>) -> LabelbookResult<YearMonth> {
    match input {
        Some(s) => s
            .parse()
            .map_err(|e| LabelbookError::Validation(format!("Invalid month '{}': {}", s, e))),
        None => Ok(YearMonth::current()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::EntityType;
    use crate::models::{Label, LabelType};
    use tempfile::TempDir;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_money("54.32").unwrap().cents(), 5432);
        assert!(parse_money("1.005").unwrap_err().is_validation());
        assert!(parse_date("03/05/2024").unwrap_err().is_validation());
        assert_eq!(
            parse_month(Some("2024-03")).unwrap(),
            YearMonth::new(2024, 3).unwrap()
        );
        assert!(parse_month(Some("2024-13")).is_err());
    }

    #[test]
    fn test_workspace_commit_persists_and_audits() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LabelbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut ws = Workspace::open(paths.clone()).unwrap();
        let id = ws
            .engine
            .create_label(Label::new("Groceries", LabelType::Expense))
            .unwrap();
        let label = ws.engine.label(id).unwrap().clone();
        ws.record(AuditEntry::create(
            EntityType::Label,
            id.to_string(),
            Some(label.name.clone()),
            &label,
        ));
        assert_eq!(ws.audit().entry_count().unwrap(), 0);
        ws.commit().unwrap();

        let reopened = Workspace::open(paths).unwrap();
        assert!(reopened.engine.find_label("groceries").is_ok());
        assert_eq!(reopened.audit().entry_count().unwrap(), 1);
    }

    #[test]
    fn test_failed_save_writes_no_audit_entry() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LabelbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut ws = Workspace::open(paths.clone()).unwrap();
        let id = ws
            .engine
            .create_label(Label::new("Groceries", LabelType::Expense))
            .unwrap();
        let label = ws.engine.label(id).unwrap().clone();
        ws.record(AuditEntry::create(
            EntityType::Label,
            id.to_string(),
            Some(label.name.clone()),
            &label,
        ));

        // A directory where the labels file should go makes the save fail
        std::fs::create_dir_all(paths.labels_file()).unwrap();
        assert!(ws.commit().is_err());
        assert_eq!(ws.audit().entry_count().unwrap(), 0);
    }
}
