//! Append-only JSONL audit log
//!
//! Entries are buffered by the caller and appended in one write once the
//! change they describe has been saved. A torn final line (a crash mid-append)
//! is skipped on read instead of making the whole history unreadable.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{LabelbookError, LabelbookResult};
use crate::models::LabelId;

use super::entry::{AuditEntry, EntityType};

/// Which entries to return from the log
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Only entries about this label or things owned by it
    pub label: Option<LabelId>,
    pub entity_type: Option<EntityType>,
    /// Keep only the newest N matches
    pub limit: Option<usize>,
}

impl AuditQuery {
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn for_label(mut self, label: LabelId) -> Self {
        self.label = Some(label);
        self
    }

    fn matches(&self, entry: &AuditEntry) -> bool {
        self.label.map_or(true, |id| entry.concerns_label(id))
            && self.entity_type.map_or(true, |t| entry.entity_type == t)
    }
}

/// Reads and appends audit entries
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append a batch of entries as consecutive lines
    ///
    /// Every entry is serialized before the file is touched, so a
    /// serialization failure appends nothing.
    pub fn append(&self, entries: &[AuditEntry]) -> LabelbookResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut lines = String::new();
        for entry in entries {
            lines.push_str(&serde_json::to_string(entry)?);
            lines.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| self.io_error("open", e))?;
        file.write_all(lines.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| self.io_error("append to", e))
    }

    pub fn log(&self, entry: &AuditEntry) -> LabelbookResult<()> {
        self.append(std::slice::from_ref(entry))
    }

    /// Entries matching a query, oldest first
    pub fn query(&self, query: &AuditQuery) -> LabelbookResult<Vec<AuditEntry>> {
        let mut found: Vec<AuditEntry> = self
            .read_all()?
            .into_iter()
            .filter(|e| query.matches(e))
            .collect();
        if let Some(limit) = query.limit {
            let excess = found.len().saturating_sub(limit);
            found = found.split_off(excess);
        }
        Ok(found)
    }

    /// Every readable entry, oldest first
    pub fn read_all(&self) -> LabelbookResult<Vec<AuditEntry>> {
        let contents = match fs::read_to_string(&self.log_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error("read", e)),
        };

        let entries = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping unreadable audit entry");
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    pub fn entry_count(&self) -> LabelbookResult<usize> {
        Ok(self.read_all()?.len())
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> LabelbookError {
        LabelbookError::Io(format!(
            "Failed to {} audit log {}: {}",
            action,
            self.log_path.display(),
            err
        ))
    }
}
