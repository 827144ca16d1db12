//! Label registry
//!
//! Owns label definitions and their match rules. Enforces case-insensitive
//! name uniqueness and rule validity. The registry does not classify; the
//! engine reclassifies after every successful registry mutation.

use std::collections::BTreeMap;

use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{Label, LabelId, LabelType, MatchRule, RuleId};

/// Field changes for an existing label; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct LabelUpdate {
    pub name: Option<String>,
    pub label_type: Option<LabelType>,
    /// `Some(None)` clears the color
    pub color: Option<Option<String>>,
    /// `Some(None)` clears the alias
    pub alias: Option<Option<String>>,
}

impl LabelUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.label_type.is_none()
            && self.color.is_none()
            && self.alias.is_none()
    }
}

/// The set of labels known to an engine
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    labels: BTreeMap<LabelId, Label>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Get a label by ID
    pub fn get(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(&id)
    }

    /// Get a label by ID or fail with an unknown reference
    pub fn require(&self, id: LabelId) -> LabelbookResult<&Label> {
        self.labels
            .get(&id)
            .ok_or_else(|| LabelbookError::label_not_found(id.to_string()))
    }

    /// Get a label by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&Label> {
        self.labels.values().find(|l| l.has_name(name))
    }

    /// Find a label by name or ID string
    pub fn find(&self, identifier: &str) -> Option<&Label> {
        if let Some(label) = self.get_by_name(identifier) {
            return Some(label);
        }

        if let Some(label) = identifier
            .parse::<LabelId>()
            .ok()
            .and_then(|id| self.labels.get(&id))
        {
            return Some(label);
        }

        // Short display form, e.g. "lbl-1a2b3c4d"
        self.labels
            .values()
            .find(|l| l.id.to_string().eq_ignore_ascii_case(identifier.trim()))
    }

    /// Find a rule by full or short display ID
    pub fn find_rule(&self, identifier: &str) -> Option<(&Label, &MatchRule)> {
        let identifier = identifier.trim();
        let full = identifier.parse::<RuleId>().ok();
        self.labels.values().find_map(|label| {
            label
                .rules
                .iter()
                .find(|r| Some(r.id) == full || r.id.to_string().eq_ignore_ascii_case(identifier))
                .map(|r| (label, r))
        })
    }

    /// All labels, ordered by name (case-insensitive)
    pub fn list(&self) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.labels.values().collect();
        labels.sort_by_key(|l| l.name.to_lowercase());
        labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// Insert a new label after validating it and every rule it carries
    pub fn insert(&mut self, label: Label) -> LabelbookResult<LabelId> {
        label
            .validate()
            .map_err(|e| LabelbookError::Validation(e.to_string()))?;
        for rule in &label.rules {
            rule.validate()
                .map_err(|e| LabelbookError::InvalidRule(format!("{}: {}", label.name, e)))?;
        }

        if self.labels.contains_key(&label.id) {
            return Err(LabelbookError::Validation(format!(
                "Label id {} is already registered",
                label.id
            )));
        }
        self.ensure_name_free(&label.name, None)?;

        let id = label.id;
        self.labels.insert(id, label);
        Ok(id)
    }

    /// Apply field changes to a label
    ///
    /// The change is validated on a copy first so a rejected update leaves
    /// the registry untouched.
    pub fn update(&mut self, id: LabelId, update: LabelUpdate) -> LabelbookResult<&Label> {
        let mut label = self.require(id)?.clone();

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            self.ensure_name_free(&name, Some(id))?;
            label.name = name;
        }
        if let Some(label_type) = update.label_type {
            label.label_type = label_type;
        }
        if let Some(color) = update.color {
            label.color = color;
        }
        if let Some(alias) = update.alias {
            label.alias = alias.filter(|a| !a.trim().is_empty());
        }

        label
            .validate()
            .map_err(|e| LabelbookError::Validation(e.to_string()))?;
        label.touch();

        Ok(self.store(label))
    }

    /// Rename a label
    pub fn rename(&mut self, id: LabelId, name: &str) -> LabelbookResult<&Label> {
        self.update(
            id,
            LabelUpdate {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )
    }

    /// Remove a label, returning it
    pub fn remove(&mut self, id: LabelId) -> LabelbookResult<Label> {
        self.labels
            .remove(&id)
            .ok_or_else(|| LabelbookError::label_not_found(id.to_string()))
    }

    /// Append a match rule to a label
    pub fn add_rule(&mut self, id: LabelId, rule: MatchRule) -> LabelbookResult<RuleId> {
        rule.validate()
            .map_err(|e| LabelbookError::InvalidRule(e.to_string()))?;

        let label = self
            .labels
            .get_mut(&id)
            .ok_or_else(|| LabelbookError::label_not_found(id.to_string()))?;
        if label.rule(rule.id).is_some() {
            return Err(LabelbookError::InvalidRule(format!(
                "Rule {} already belongs to {}",
                rule.id, label.name
            )));
        }

        let rule_id = rule.id;
        label.rules.push(rule);
        label.touch();
        Ok(rule_id)
    }

    /// Remove a match rule from a label, returning it
    pub fn remove_rule(&mut self, id: LabelId, rule_id: RuleId) -> LabelbookResult<MatchRule> {
        let label = self
            .labels
            .get_mut(&id)
            .ok_or_else(|| LabelbookError::label_not_found(id.to_string()))?;
        let position = label
            .rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| LabelbookError::rule_not_found(rule_id.to_string()))?;

        let rule = label.rules.remove(position);
        label.touch();
        Ok(rule)
    }

    /// Find which label owns a rule
    pub fn rule_owner(&self, rule_id: RuleId) -> Option<&Label> {
        self.labels.values().find(|l| l.rule(rule_id).is_some())
    }

    fn ensure_name_free(&self, name: &str, except: Option<LabelId>) -> LabelbookResult<()> {
        match self.get_by_name(name) {
            Some(existing) if Some(existing.id) != except => {
                Err(LabelbookError::DuplicateName(name.trim().to_string()))
            }
            _ => Ok(()),
        }
    }

    fn store(&mut self, label: Label) -> &Label {
        let id = label.id;
        self.labels.insert(id, label);
        &self.labels[&id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rule::{AmountBound, AmountPredicate, TextPredicate};
    use crate::models::Money;

    fn kroger_rule() -> MatchRule {
        MatchRule::new("kroger").with_payee(TextPredicate::contains("KROGER"))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = LabelRegistry::new();
        let id = registry
            .insert(Label::new("Groceries", LabelType::Expense))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_by_name("GROCERIES").unwrap().id, id);
        assert_eq!(registry.find(&id.to_string()).unwrap().id, id);
        assert_eq!(registry.find(&id.as_uuid().to_string()).unwrap().id, id);
        assert!(registry.find("Dining").is_none());
    }

    #[test]
    fn test_find_rule_by_display_id() {
        let mut registry = LabelRegistry::new();
        let id = registry
            .insert(Label::new("Groceries", LabelType::Expense).with_rule(kroger_rule()))
            .unwrap();
        let rule_id = registry.get(id).unwrap().rules[0].id;

        let (owner, rule) = registry.find_rule(&rule_id.to_string()).unwrap();
        assert_eq!(owner.id, id);
        assert_eq!(rule.id, rule_id);
        assert!(registry.find_rule("rul-00000000").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected_case_insensitively() {
        let mut registry = LabelRegistry::new();
        registry
            .insert(Label::new("Groceries", LabelType::Expense))
            .unwrap();

        let err = registry
            .insert(Label::new("groceries", LabelType::Expense))
            .unwrap_err();
        assert!(matches!(err, LabelbookError::DuplicateName(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rename_checks_other_labels_only() {
        let mut registry = LabelRegistry::new();
        let grocery = registry
            .insert(Label::new("Grocery", LabelType::Expense))
            .unwrap();
        registry.insert(Label::new("Dining", LabelType::Expense)).unwrap();

        // Case-only rename of itself is fine
        registry.rename(grocery, "GROCERY").unwrap();

        let err = registry.rename(grocery, "dining").unwrap_err();
        assert!(matches!(err, LabelbookError::DuplicateName(_)));
        assert_eq!(registry.get(grocery).unwrap().name, "GROCERY");

        registry.rename(grocery, "Groceries").unwrap();
        assert_eq!(registry.get(grocery).unwrap().name, "Groceries");
    }

    #[test]
    fn test_update_fields() {
        let mut registry = LabelRegistry::new();
        let id = registry.insert(Label::new("Rent", LabelType::Expense)).unwrap();

        let label = registry
            .update(
                id,
                LabelUpdate {
                    label_type: Some(LabelType::Bill),
                    color: Some(Some("red".into())),
                    alias: Some(Some("Landlord".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(label.label_type, LabelType::Bill);
        assert_eq!(label.color.as_deref(), Some("red"));
        assert_eq!(label.alias.as_deref(), Some("Landlord"));

        let label = registry
            .update(
                id,
                LabelUpdate {
                    alias: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(label.alias.is_none());
    }

    #[test]
    fn test_invalid_update_leaves_label_untouched() {
        let mut registry = LabelRegistry::new();
        let id = registry.insert(Label::new("Rent", LabelType::Bill)).unwrap();

        let result = registry.update(
            id,
            LabelUpdate {
                name: Some("   ".into()),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(registry.get(id).unwrap().name, "Rent");
    }

    #[test]
    fn test_rules() {
        let mut registry = LabelRegistry::new();
        let id = registry
            .insert(Label::new("Groceries", LabelType::Expense))
            .unwrap();

        let rule_id = registry.add_rule(id, kroger_rule()).unwrap();
        assert_eq!(registry.get(id).unwrap().rules.len(), 1);
        assert_eq!(registry.rule_owner(rule_id).unwrap().id, id);

        let removed = registry.remove_rule(id, rule_id).unwrap();
        assert_eq!(removed.id, rule_id);
        assert!(registry.get(id).unwrap().rules.is_empty());

        let err = registry.remove_rule(id, rule_id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let mut registry = LabelRegistry::new();
        let id = registry
            .insert(Label::new("Groceries", LabelType::Expense))
            .unwrap();

        let err = registry.add_rule(id, MatchRule::new("empty")).unwrap_err();
        assert!(matches!(err, LabelbookError::InvalidRule(_)));

        let ambiguous = MatchRule::new("ambiguous").with_amount(AmountPredicate {
            bound: AmountBound::Exact(Money::from_cents(100)),
            basis: None,
        });
        let err = registry.add_rule(id, ambiguous).unwrap_err();
        assert!(matches!(err, LabelbookError::InvalidRule(_)));
        assert!(registry.get(id).unwrap().rules.is_empty());

        let err = registry
            .insert(Label::new("Dining", LabelType::Expense).with_rule(MatchRule::new("empty")))
            .unwrap_err();
        assert!(matches!(err, LabelbookError::InvalidRule(_)));
    }

    #[test]
    fn test_unknown_label() {
        let mut registry = LabelRegistry::new();
        let err = registry.add_rule(LabelId::new(), kroger_rule()).unwrap_err();
        assert!(err.is_not_found());
        assert!(registry.remove(LabelId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_is_sorted_by_name() {
        let mut registry = LabelRegistry::new();
        registry.insert(Label::new("utilities", LabelType::Bill)).unwrap();
        registry.insert(Label::new("Groceries", LabelType::Expense)).unwrap();
        registry.insert(Label::new("Salary", LabelType::Income)).unwrap();

        let names: Vec<&str> = registry.list().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Groceries", "Salary", "utilities"]);
    }
}
