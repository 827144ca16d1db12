//! Label model
//!
//! A label is a user-defined category. It owns an ordered list of match rules
//! and matches a transaction when any one of them does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{LabelId, RuleId};
use super::rule::MatchRule;
use super::transaction::Transaction;

/// Kind of label, which decides how amounts are oriented and whether it can be budgeted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Income,
    Bill,
    #[default]
    Expense,
}

impl LabelType {
    pub fn all() -> &'static [Self] {
        &[Self::Income, Self::Bill, Self::Expense]
    }

    /// Only expense labels accept budgets and splits count toward them
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Bill => write!(f, "bill"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for LabelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "bill" | "bills" => Ok(Self::Bill),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(format!("Unknown label type: {}", s)),
        }
    }
}

/// A user-defined category with match rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Unique identifier
    pub id: LabelId,

    /// Label name, unique case-insensitively within the registry
    pub name: String,

    #[serde(rename = "type")]
    pub label_type: LabelType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Replaces the raw payee when displaying transactions carrying this label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Match rules, evaluated as a disjunction
    #[serde(default)]
    pub rules: Vec<MatchRule>,

    /// When the label was created
    pub created_at: DateTime<Utc>,

    /// When the label was last modified
    pub updated_at: DateTime<Utc>,
}

impl Label {
    /// Create a new label with no rules
    pub fn new(name: impl Into<String>, label_type: LabelType) -> Self {
        let now = Utc::now();
        Self {
            id: LabelId::new(),
            name: name.into().trim().to_string(),
            label_type,
            color: None,
            alias: None,
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_rule(mut self, rule: MatchRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Find a rule by id
    pub fn rule(&self, id: RuleId) -> Option<&MatchRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Check if any rule matches the transaction
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.rules.iter().any(|rule| rule.matches(txn))
    }

    /// Case-insensitive name comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Bump the modification time
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the label's own fields (rules are validated separately)
    pub fn validate(&self) -> Result<(), LabelValidationError> {
        if self.name.trim().is_empty() {
            return Err(LabelValidationError::EmptyName);
        }

        if self.name.chars().count() > 50 {
            return Err(LabelValidationError::NameTooLong(self.name.chars().count()));
        }

        if let Some(color) = &self.color {
            if color.trim().is_empty() {
                return Err(LabelValidationError::EmptyColor);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelValidationError {
    EmptyName,
    NameTooLong(usize),
    EmptyColor,
}

impl fmt::Display for LabelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Label name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Label name too long ({} chars, max 50)", len)
            }
            Self::EmptyColor => write!(f, "Label color cannot be blank"),
        }
    }
}

impl std::error::Error for LabelValidationError {}
