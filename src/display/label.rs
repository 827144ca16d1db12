//! Label display formatting
//!
//! Formats labels for terminal output in table and detail views.

use crate::engine::Engine;
use crate::models::{BudgetStatus, Label, YearMonth};

use super::truncate;

/// Format labels as a table with rule and assignment counts
pub fn format_label_list(engine: &Engine, labels: &[&Label]) -> String {
    if labels.is_empty() {
        return "No labels found.\n\nCreate one with 'labelbook label create <NAME>'.".to_string();
    }

    let name_width = labels
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 30);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<8}  {:>5}  {:>5}  {:<12}  {}\n",
        "Name",
        "Type",
        "Rules",
        "Txns",
        "ID",
        "Alias",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<8}  {:->5}  {:->5}  {:-<12}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for label in labels {
        let assigned = engine.assignments().transactions_for(label.id).len();
        output.push_str(&format!(
            "{:<name_width$}  {:<8}  {:>5}  {:>5}  {:<12}  {}\n",
            truncate(&label.name, name_width),
            label.label_type,
            label.rules.len(),
            assigned,
            label.id,
            label.alias.as_deref().unwrap_or(""),
            name_width = name_width,
        ));
    }

    output
}

/// Format a label with its rules and current budget status
pub fn format_label_details(engine: &Engine, label: &Label) -> String {
    let mut output = String::new();

    output.push_str(&format!("Label: {}\n", label.name));
    output.push_str(&format!("  ID:      {}\n", label.id));
    output.push_str(&format!("  Type:    {}\n", label.label_type));
    if let Some(color) = &label.color {
        output.push_str(&format!("  Color:   {}\n", color));
    }
    if let Some(alias) = &label.alias {
        output.push_str(&format!("  Alias:   {}\n", alias));
    }

    let assignments = engine.assignments();
    let transactions = assignments.transactions_for(label.id);
    let manual = transactions
        .iter()
        .filter(|t| assignments.is_manual(t, label.id))
        .count();
    output.push_str(&format!(
        "  Assigned: {} transactions ({} manual)\n",
        transactions.len(),
        manual
    ));

    if let Ok(BudgetStatus::Budgeted {
        target,
        actual,
        remaining,
    }) = engine.budget_status(label.id, YearMonth::current())
    {
        output.push_str(&format!(
            "  Budget:  {} target, {} spent, {} remaining this month\n",
            target, actual, remaining
        ));
    }

    output.push_str("\nRules:\n");
    if label.rules.is_empty() {
        output.push_str("  (none; assigned manually only)\n");
    }
    for rule in &label.rules {
        output.push_str(&format!("  {}  {:<16} {}\n", rule.id, rule.name, rule.describe()));
    }

    output
}
