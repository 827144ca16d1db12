//! User settings for labelbook
//!
//! Display preferences, the statement date format, and account aliases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::paths::LabelbookPaths;
use crate::error::LabelbookError;
use crate::storage::file_io::{load_json, save_json};

/// User settings for labelbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when displaying amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Date format of imported statement rows (strftime format)
    #[serde(default = "default_date_format")]
    pub import_date_format: String,

    /// Display names for account numbers
    #[serde(default)]
    pub account_aliases: BTreeMap<String, String>,

    /// Account used when a command accepts one and none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            import_date_format: default_date_format(),
            account_aliases: BTreeMap::new(),
            default_account: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &LabelbookPaths) -> Result<Self, LabelbookError> {
        load_json(&paths.settings_file(), "settings").map_err(|e| match e {
            LabelbookError::Storage(msg) => LabelbookError::Config(msg),
            other => other,
        })
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LabelbookPaths) -> Result<(), LabelbookError> {
        paths.ensure_directories()?;
        save_json(&paths.settings_file(), "settings", self)
    }

    /// Display name for an account: its alias, or the raw number
    pub fn account_display(&self, account: &str) -> String {
        self.account_aliases
            .get(account)
            .cloned()
            .unwrap_or_else(|| account.to_string())
    }

    /// Set or clear an account alias
    pub fn set_account_alias(&mut self, account: &str, alias: Option<&str>) {
        match alias.map(str::trim).filter(|a| !a.is_empty()) {
            Some(alias) => {
                self.account_aliases
                    .insert(account.to_string(), alias.to_string());
            }
            None => {
                self.account_aliases.remove(account);
            }
        }
    }

    /// Set a scalar setting by key
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), LabelbookError> {
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "date_format" => self.date_format = checked_date_format(value)?,
            "import_date_format" => self.import_date_format = checked_date_format(value)?,
            "default_account" => {
                self.default_account = Some(value.trim().to_string()).filter(|v| !v.is_empty())
            }
            _ => {
                return Err(LabelbookError::Config(format!(
                    "Unknown setting '{}'",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn checked_date_format(format: &str) -> Result<String, LabelbookError> {
    use chrono::format::{Item, StrftimeItems};

    if format.trim().is_empty() || StrftimeItems::new(format).any(|i| matches!(i, Item::Error)) {
        return Err(LabelbookError::Config(format!(
            "Invalid date format '{}'",
            format
        )));
    }
    Ok(format.to_string())
}
