//! Transaction display formatting
//!
//! Register and detail views. Payees are shown through label aliases and
//! accounts through the configured account aliases.

use crate::config::Settings;
use crate::engine::Engine;
use crate::models::{AssignmentSource, Transaction};

use super::truncate;

/// Format a single transaction for display (register row)
pub fn format_transaction_row(engine: &Engine, settings: &Settings, txn: &Transaction) -> String {
    let labels: Vec<String> = engine
        .labels_for(&txn.id)
        .into_iter()
        .map(|l| l.name.clone())
        .collect();
    let split_indicator = match engine.splits_for(&txn.id).len() {
        0 => String::new(),
        n => format!(" [{}]", n),
    };

    let payee = engine.display_payee(txn);
    let payee = if payee.is_empty() {
        "(no payee)".to_string()
    } else {
        payee
    };

    format!(
        "{:<12} {:10} {:<12} {:<24} {:>12}  {}{}",
        truncate(txn.id.as_str(), 12),
        txn.date.format(&settings.date_format),
        truncate(&settings.account_display(txn.account_id.as_str()), 12),
        truncate(&payee, 24),
        txn.amount.format_with_symbol(&settings.currency_symbol),
        labels.join(", "),
        split_indicator
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(
    engine: &Engine,
    settings: &Settings,
    transactions: &[&Transaction],
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12} {:10} {:<12} {:<24} {:>12}  {}\n",
        "ID", "Date", "Account", "Payee", "Amount", "Labels"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(engine, settings, txn));
        output.push('\n');
    }

    output
}

/// Format transaction details with assignments and splits
pub fn format_transaction_details(
    engine: &Engine,
    settings: &Settings,
    txn: &Transaction,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Account:     {}\n",
        settings.account_display(txn.account_id.as_str())
    ));
    output.push_str(&format!("Date:        {}\n", txn.date.format(&settings.date_format)));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(&settings.currency_symbol)
    ));
    output.push_str(&format!("Type:        {}\n", txn.tx_type));

    if !txn.payee.is_empty() {
        output.push_str(&format!("Payee:       {}\n", txn.payee));
    }
    if !txn.memo.is_empty() {
        output.push_str(&format!("Memo:        {}\n", txn.memo));
    }

    let assignments = engine.assignments_for(&txn.id);
    if assignments.is_empty() {
        output.push_str("Labels:      (none)\n");
    } else {
        output.push_str("Labels:\n");
        for assignment in &assignments {
            let name = engine
                .label(assignment.label_id)
                .map(|l| l.name.as_str())
                .unwrap_or("?");
            let source = match assignment.source {
                AssignmentSource::Automatic => "rule",
                AssignmentSource::Manual => "manual",
            };
            output.push_str(&format!("  {} ({})\n", name, source));
        }
    }

    let splits = engine.splits_for(&txn.id);
    if !splits.is_empty() {
        output.push_str("\nSplits:\n");
        for split in &splits {
            let name = engine
                .label(split.label_id)
                .map(|l| l.name.as_str())
                .unwrap_or("?");
            let memo_part = if split.memo.is_empty() {
                String::new()
            } else {
                format!(" - {}", split.memo)
            };
            output.push_str(&format!(
                "  {} {} to {}{}\n",
                split.id,
                split.amount.format_with_symbol(&settings.currency_symbol),
                name,
                memo_part
            ));
        }
        if let Ok(remainder) = engine.remainder(&txn.id) {
            output.push_str(&format!(
                "  Unallocated: {}\n",
                remainder.format_with_symbol(&settings.currency_symbol)
            ));
        }
    }

    output
}
