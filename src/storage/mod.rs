//! Storage layer for labelbook
//!
//! Engine state lives in four JSON files under the data directory. Automatic
//! assignments are never written; they are recomputed from the rules on load.

pub mod file_io;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::paths::LabelbookPaths;
use crate::engine::Snapshot;
use crate::error::LabelbookError;
use crate::models::{Assignment, Budget, Label, Split, Transaction};

use file_io::{load_json, save_json};

/// The files a snapshot is spread across
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Transactions,
    Labels,
    /// Manual assignments and splits
    Ledger,
    Budgets,
}

impl DataFile {
    pub fn path(self, paths: &LabelbookPaths) -> PathBuf {
        match self {
            Self::Transactions => paths.transactions_file(),
            Self::Labels => paths.labels_file(),
            Self::Ledger => paths.ledger_file(),
            Self::Budgets => paths.budgets_file(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Labels => "labels",
            Self::Ledger => "ledger",
            Self::Budgets => "budgets",
        }
    }
}

/// On-disk shape of the ledger file
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    manual_assignments: Vec<Assignment>,
    #[serde(default)]
    splits: Vec<Split>,
}

/// Borrowed form of [`LedgerFile`] for saving
#[derive(Serialize)]
struct LedgerFileRef<'a> {
    manual_assignments: &'a [Assignment],
    splits: &'a [Split],
}

/// Reads and writes engine snapshots
pub struct Storage {
    paths: LabelbookPaths,
}

impl Storage {
    pub fn new(paths: LabelbookPaths) -> Result<Self, LabelbookError> {
        paths.ensure_directories()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &LabelbookPaths {
        &self.paths
    }

    fn read<T>(&self, file: DataFile) -> Result<T, LabelbookError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        load_json(&file.path(&self.paths), file.describe())
    }

    fn write<T: Serialize + ?Sized>(&self, file: DataFile, value: &T) -> Result<(), LabelbookError> {
        save_json(&file.path(&self.paths), file.describe(), value)
    }

    /// Load everything from disk; missing files read as empty
    pub fn load(&self) -> Result<Snapshot, LabelbookError> {
        let transactions: Vec<Transaction> = self.read(DataFile::Transactions)?;
        let labels: Vec<Label> = self.read(DataFile::Labels)?;
        let ledger: LedgerFile = self.read(DataFile::Ledger)?;
        let budgets: Vec<Budget> = self.read(DataFile::Budgets)?;

        debug!(
            transactions = transactions.len(),
            labels = labels.len(),
            splits = ledger.splits.len(),
            "loaded snapshot"
        );

        Ok(Snapshot {
            transactions,
            labels,
            manual_assignments: ledger.manual_assignments,
            splits: ledger.splits,
            budgets,
        })
    }

    /// Save everything to disk, one file at a time
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), LabelbookError> {
        self.write(DataFile::Transactions, &snapshot.transactions)?;
        self.write(DataFile::Labels, &snapshot.labels)?;
        self.write(
            DataFile::Ledger,
            &LedgerFileRef {
                manual_assignments: &snapshot.manual_assignments,
                splits: &snapshot.splits,
            },
        )?;
        self.write(DataFile::Budgets, &snapshot.budgets)
    }
}
