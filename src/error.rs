//! Custom error types for labelbook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Domain failures raised by the engine get
//! their own variants so callers can match on them; everything else (I/O,
//! parsing, configuration) is carried as a message.

use thiserror::Error;

use crate::models::Money;

/// The main error type for labelbook operations
#[derive(Error, Debug)]
pub enum LabelbookError {
    /// A label name collides (case-insensitively) with an existing label
    #[error("A label named '{0}' already exists")]
    DuplicateName(String),

    /// A split references a label that is not assigned to the transaction
    #[error("Label '{label}' is not assigned to transaction {transaction}")]
    LabelNotAssigned { transaction: String, label: String },

    /// A split would push the allocated total past the transaction amount
    #[error(
        "Split of {requested} exceeds transaction {transaction}: {allocated} of {total} already allocated"
    )]
    OverAllocation {
        transaction: String,
        requested: Money,
        allocated: Money,
        total: Money,
    },

    /// Operation not permitted for this label type (e.g. budgeting an income label)
    #[error("Invalid label type: {0}")]
    InvalidLabelType(String),

    /// A match rule is empty, inverted, or missing its amount basis
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// An id names a transaction, label, rule or split that does not exist
    #[error("{entity_type} not found: {identifier}")]
    UnknownReference {
        entity_type: &'static str,
        identifier: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl LabelbookError {
    /// Create an "unknown reference" error for labels
    pub fn label_not_found(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "Label",
            identifier: identifier.into(),
        }
    }

    /// Create an "unknown reference" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create an "unknown reference" error for match rules
    pub fn rule_not_found(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "Rule",
            identifier: identifier.into(),
        }
    }

    /// Create an "unknown reference" error for splits
    pub fn split_not_found(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "Split",
            identifier: identifier.into(),
        }
    }

    /// Check if this is an "unknown reference" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownReference { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for LabelbookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LabelbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for LabelbookError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for labelbook operations
pub type LabelbookResult<T> = Result<T, LabelbookError>;
