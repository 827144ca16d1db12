//! JSON file helpers for the state and settings files
//!
//! Writes go through a hidden sibling temp file that is synced and renamed
//! over the target, so a file on disk is always either the old or the new
//! version. Read errors name the file and the position of the bad input.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LabelbookError, LabelbookResult};

/// Load `what` from a JSON file; a missing or blank file reads as empty
pub fn load_json<T>(path: &Path, what: &str) -> LabelbookResult<T>
where
    T: DeserializeOwned + Default,
{
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(LabelbookError::Storage(format!(
                "Failed to read {} from {}: {}",
                what,
                path.display(),
                e
            )))
        }
    };

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|e| {
        LabelbookError::Storage(format!(
            "{} file {} is unreadable at line {}, column {}: {}",
            what,
            path.display(),
            e.line(),
            e.column(),
            e
        ))
    })
}

/// Replace a JSON file with `value`
///
/// The value is serialized in full before anything on disk changes.
pub fn save_json<T>(path: &Path, what: &str, value: &T) -> LabelbookResult<()>
where
    T: Serialize + ?Sized,
{
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| LabelbookError::Storage(format!("Failed to encode {}: {}", what, e)))?;
    bytes.push(b'\n');

    replace_file(path, &bytes).map_err(|e| {
        LabelbookError::Storage(format!(
            "Failed to write {} to {}: {}",
            what,
            path.display(),
            e
        ))
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });

    match written.and_then(|_| fs::rename(&temp, path)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&temp);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, LabelId, Money};
    use tempfile::TempDir;

    #[test]
    fn test_missing_and_blank_files_read_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("budgets.json");
        let blank = temp_dir.path().join("labels.json");
        fs::write(&blank, "  \n").unwrap();

        let budgets: Vec<Budget> = load_json(&missing, "budgets").unwrap();
        let labels: Vec<Budget> = load_json(&blank, "labels").unwrap();
        assert!(budgets.is_empty());
        assert!(labels.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("budgets.json");
        let budgets = vec![Budget::new(LabelId::new(), Money::from_cents(40000))];

        save_json(&path, "budgets", &budgets).unwrap();
        let loaded: Vec<Budget> = load_json(&path, "budgets").unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].monthly_target.cents(), 40000);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_corrupt_file_names_the_file_and_position() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, "{\n  \"splits\": [,]\n}").unwrap();

        let err = load_json::<Vec<Budget>>(&path, "ledger").unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, LabelbookError::Storage(_)));
        assert!(message.contains("ledger file"));
        assert!(message.contains("ledger.json"));
        assert!(message.contains("line 2"));
    }

    #[test]
    fn test_failed_replace_keeps_old_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("budgets.json");
        save_json(&path, "budgets", &Vec::<Budget>::new()).unwrap();

        // Occupy the temp path with a directory so the write cannot start
        fs::create_dir(temp_path(&path)).unwrap();
        let budgets = vec![Budget::new(LabelId::new(), Money::from_cents(100))];
        assert!(save_json(&path, "budgets", &budgets).is_err());

        let loaded: Vec<Budget> = load_json(&path, "budgets").unwrap();
        assert!(loaded.is_empty());
    }
}
