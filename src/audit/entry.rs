//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::LabelId;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Label,
    Rule,
    Assignment,
    Split,
    Budget,
    Import,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Label => write!(f, "Label"),
            EntityType::Rule => write!(f, "Rule"),
            EntityType::Assignment => write!(f, "Assignment"),
            EntityType::Split => write!(f, "Split"),
            EntityType::Budget => write!(f, "Budget"),
            EntityType::Import => write!(f, "Import"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// ID of the affected entity
    pub entity_id: String,

    /// Human-readable description of the entity (e.g., label name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Entity before the operation (updates and deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    /// Entity after the operation (creates and updates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// Top-level fields that changed, for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,

    /// Owning label for rule, split and assignment entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_id: Option<String>,
}

impl AuditEntry {
    /// Create a new audit entry for a create operation
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: serde_json::to_value(entity).ok(),
            diff_summary: None,
            label_id: None,
        }
    }

    /// Create a new audit entry for an update operation, summarizing the change
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => summarize_changes(b, a),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            operation: Operation::Update,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before,
            after,
            diff_summary,
            label_id: None,
        }
    }

    /// Create a new audit entry for a delete operation
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Delete,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: serde_json::to_value(entity).ok(),
            after: None,
            diff_summary: None,
            label_id: None,
        }
    }

    /// Tie the entry to the label it was made under
    pub fn for_label(mut self, label_id: LabelId) -> Self {
        self.label_id = Some(label_id.as_uuid().to_string());
        self
    }

    /// Whether the entry is about the label or something owned by it
    pub fn concerns_label(&self, label_id: LabelId) -> bool {
        self.label_id.as_deref() == Some(label_id.as_uuid().to_string().as_str())
            || (matches!(self.entity_type, EntityType::Label | EntityType::Budget)
                && self.entity_id == label_id.to_string())
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

/// Describe changed top-level fields, or `None` when nothing changed
fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return (before != after)
            .then(|| format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();
    for (key, before_val) in before_obj {
        match after_obj.get(key) {
            Some(after_val) if after_val != before_val => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(before_val),
                format_value(after_val)
            )),
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
        }
    }
    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    // updated_at moves on every touch
    changes.retain(|c| !c.starts_with("updated_at:"));

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
        assert_eq!(EntityType::Split.to_string(), "Split");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"name": "Groceries", "type": "expense"});
        let entry = AuditEntry::create(
            EntityType::Label,
            "lbl-12345678",
            Some("Groceries".to_string()),
            &data,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Label);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry_summarizes_changes() {
        let before = json!({"name": "Grocery", "color": null, "updated_at": "a"});
        let after = json!({"name": "Groceries", "color": null, "updated_at": "b"});

        let entry = AuditEntry::update(EntityType::Label, "lbl-1", None, &before, &after);

        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("name: \"Grocery\" -> \"Groceries\"")
        );
    }

    #[test]
    fn test_update_without_changes_has_no_summary() {
        let data = json!({"monthly_target": 40000});
        let entry = AuditEntry::update(EntityType::Budget, "lbl-1", None, &data, &data);
        assert!(entry.diff_summary.is_none());
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"alias": "Food"});
        let after = json!({"color": "#00ff00"});
        let summary = summarize_changes(&before, &after).unwrap();
        assert!(summary.contains("alias: \"Food\" -> (removed)"));
        assert!(summary.contains("color: (added) -> \"#00ff00\""));
    }

    #[test]
    fn test_delete_entry() {
        let data = json!({"amount": 2000});
        let entry = AuditEntry::delete(EntityType::Split, "spl-1", None, &data);

        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_concerns_label() {
        let groceries = LabelId::new();
        let dining = LabelId::new();

        let label = AuditEntry::create(
            EntityType::Label,
            groceries.to_string(),
            None,
            &json!({"name": "Groceries"}),
        );
        let split = AuditEntry::create(EntityType::Split, "spl-1", None, &json!({"amount": 100}))
            .for_label(groceries);
        let import = AuditEntry::create(EntityType::Import, "march.csv", None, &json!([]));

        assert!(label.concerns_label(groceries));
        assert!(split.concerns_label(groceries));
        assert!(!split.concerns_label(dining));
        assert!(!import.concerns_label(groceries));
    }

    #[test]
    fn test_entry_without_label_field_still_parses() {
        let line = r#"{"timestamp":"2024-03-05T12:00:00Z","operation":"create","entity_type":"rule","entity_id":"rul-1"}"#;
        let entry: AuditEntry = serde_json::from_str(line).unwrap();
        assert!(entry.label_id.is_none());
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::create(
            EntityType::Label,
            "lbl-12345678",
            Some("Groceries".to_string()),
            &json!({"name": "Groceries"}),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("CREATE"));
        assert!(formatted.contains("Label"));
        assert!(formatted.contains("Groceries"));
    }
}
