//! Transaction CLI commands

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_month, Workspace};
use crate::audit::{AuditEntry, EntityType};
use crate::display::{format_transaction_details, format_transaction_register};
use crate::error::{LabelbookError, LabelbookResult};
use crate::import::import_csv;
use crate::models::{AccountId, Assignment, Transaction, YearMonth};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions
    List {
        /// Filter by account number
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by label name or ID
        #[arg(short, long)]
        label: Option<String>,
        /// Filter by month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        /// Only transactions without any label
        #[arg(long, conflicts_with = "label")]
        unlabeled: bool,
        /// Number of most recent transactions to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },

    /// Import transactions from a CSV statement
    Import {
        /// Path to CSV file
        file: PathBuf,
        /// Date format of the file (strftime), overriding the configured one
        #[arg(long)]
        date_format: Option<String>,
    },

    /// Assign a label by hand
    Assign {
        /// Transaction ID
        id: String,
        /// Label name or ID
        label: String,
    },

    /// Remove a manual label assignment
    Unassign {
        /// Transaction ID
        id: String,
        /// Label name or ID
        label: String,
    },

    /// List months that have activity
    Months {
        /// Filter by account number
        #[arg(short, long)]
        account: Option<String>,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    ws: &mut Workspace,
    cmd: TransactionCommands,
) -> LabelbookResult<()> {
    match cmd {
        TransactionCommands::List {
            account,
            label,
            month,
            unlabeled,
            limit,
        } => {
            let account = account.or_else(|| ws.settings.default_account.clone());
            let period = month.as_deref().map(|m| parse_month(Some(m))).transpose()?;

            let mut transactions: Vec<&Transaction> = match &label {
                Some(label) => {
                    let id = ws.engine.find_label(label)?.id;
                    ws.engine.transactions_with_label(id)?
                }
                None => ws.engine.transactions(),
            };
            transactions.retain(|t| {
                account.as_deref().map_or(true, |a| t.account_id.as_str() == a)
                    && period.map_or(true, |p| YearMonth::from_date(t.date) == p)
                    && (!unlabeled || ws.engine.assignments().labels_for(&t.id).is_empty())
            });
            if let Some(limit) = limit {
                let skip = transactions.len().saturating_sub(limit);
                transactions.drain(..skip);
            }

            print!(
                "{}",
                format_transaction_register(&ws.engine, &ws.settings, &transactions)
            );
        }

        TransactionCommands::Show { id } => {
            let txn = ws.transaction(&id)?;
            print!(
                "{}",
                format_transaction_details(&ws.engine, &ws.settings, txn)
            );
        }

        TransactionCommands::Import { file, date_format } => {
            let reader = File::open(&file).map_err(|e| {
                LabelbookError::Import(format!("Failed to open {}: {}", file.display(), e))
            })?;
            let date_format = date_format.unwrap_or_else(|| ws.settings.import_date_format.clone());

            let summary = import_csv(&mut ws.engine, reader, &date_format)?;

            for (row, error) in &summary.errors {
                eprintln!("  Row {}: {}", row, error);
            }
            if summary.report.added_count() > 0 {
                ws.record(AuditEntry::create(
                    EntityType::Import,
                    file.display().to_string(),
                    None,
                    &summary.report.added,
                ));
            }

            println!("Imported {} transactions", summary.report.added_count());
            if summary.report.duplicate_count() > 0 {
                println!(
                    "  Skipped {} already imported",
                    summary.report.duplicate_count()
                );
            }
            if !summary.errors.is_empty() {
                println!("  {} rows could not be read", summary.errors.len());
            }
        }

        TransactionCommands::Assign { id, label } => {
            let txn_id = ws.transaction(&id)?.id.clone();
            let label = ws.engine.find_label(&label)?.clone();

            if ws.engine.assign_label(&txn_id, label.id)? {
                ws.record(AuditEntry::create(
                    EntityType::Assignment,
                    txn_id.to_string(),
                    Some(label.name.clone()),
                    &Assignment::manual(txn_id.clone(), label.id),
                )
                .for_label(label.id));
                println!("Assigned '{}' to {}", label.name, txn_id);
            } else {
                println!("'{}' is already assigned to {}", label.name, txn_id);
            }
        }

        TransactionCommands::Unassign { id, label } => {
            let txn_id = ws.transaction(&id)?.id.clone();
            let label = ws.engine.find_label(&label)?.clone();

            let dropped = ws.engine.unassign_label(&txn_id, label.id)?;
            ws.record(AuditEntry::delete(
                EntityType::Assignment,
                txn_id.to_string(),
                Some(label.name.clone()),
                &Assignment::manual(txn_id.clone(), label.id),
            )
            .for_label(label.id));
            for split in &dropped {
                ws.record(AuditEntry::delete(
                    EntityType::Split,
                    split.id.to_string(),
                    Some(label.name.clone()),
                    split,
                )
                .for_label(label.id));
            }

            println!("Removed '{}' from {}", label.name, txn_id);
            if ws.engine.assignments().is_assigned(&txn_id, label.id) {
                println!("  Still assigned by a matching rule");
            }
            if !dropped.is_empty() {
                println!("  Removed {} splits", dropped.len());
            }
        }

        TransactionCommands::Months { account } => {
            let account = account.map(AccountId::new);
            let months = ws.engine.months_with_activity(account.as_ref());
            if months.is_empty() {
                println!("No transactions found.");
            }
            for (year, months) in months {
                let names: Vec<String> = months.iter().map(|m| format!("{:02}", m)).collect();
                println!("{}: {}", year, names.join(" "));
            }
        }
    }

    Ok(())
}
