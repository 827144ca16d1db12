//! Split CLI commands

use clap::Subcommand;

use super::{parse_money, Workspace};
use crate::audit::{AuditEntry, EntityType};
use crate::error::{LabelbookError, LabelbookResult};

/// Split subcommands
#[derive(Subcommand)]
pub enum SplitCommands {
    /// Attribute part of a transaction to one of its labels
    Add {
        /// Transaction ID
        transaction: String,
        /// Label name or ID (must be assigned to the transaction)
        label: String,
        /// Amount to attribute (positive)
        amount: String,
    },

    /// Remove a split
    Remove {
        /// Split ID
        split: String,
    },

    /// Show the splits on a transaction
    #[command(alias = "list")]
    Show {
        /// Transaction ID
        transaction: String,
    },
}

/// Handle a split command
pub fn handle_split_command(ws: &mut Workspace, cmd: SplitCommands) -> LabelbookResult<()> {
    let symbol = ws.settings.currency_symbol.clone();

    match cmd {
        SplitCommands::Add {
            transaction,
            label,
            amount,
        } => {
            let txn_id = ws.transaction(&transaction)?.id.clone();
            let label = ws.engine.find_label(&label)?.clone();
            let amount = parse_money(&amount)?;

            let split_id = ws.engine.add_split(&txn_id, label.id, amount)?;
            if let Some(split) = ws.engine.ledger().get(split_id).cloned() {
                ws.record(AuditEntry::create(
                    EntityType::Split,
                    split_id.to_string(),
                    Some(label.name.clone()),
                    &split,
                )
                .for_label(label.id));
            }

            println!(
                "Split {} of {} to '{}' ({})",
                amount.format_with_symbol(&symbol),
                txn_id,
                label.name,
                split_id
            );
            println!(
                "  Unallocated: {}",
                ws.engine.remainder(&txn_id)?.format_with_symbol(&symbol)
            );
        }

        SplitCommands::Remove { split } => {
            let split_id = ws
                .engine
                .ledger()
                .find(&split)
                .map(|s| s.id)
                .ok_or_else(|| LabelbookError::split_not_found(&split))?;

            let removed = ws.engine.remove_split(split_id)?;
            let label_name = ws.engine.label(removed.label_id).map(|l| l.name.clone());
            ws.record(AuditEntry::delete(
                EntityType::Split,
                split_id.to_string(),
                label_name,
                &removed,
            )
            .for_label(removed.label_id));

            println!(
                "Removed split {} ({} of {})",
                split_id,
                removed.amount.format_with_symbol(&symbol),
                removed.transaction_id
            );
        }

        SplitCommands::Show { transaction } => {
            let txn = ws.transaction(&transaction)?;
            let splits = ws.engine.splits_for(&txn.id);
            if splits.is_empty() {
                println!("No splits on {}.", txn.id);
                return Ok(());
            }

            for split in &splits {
                let name = ws
                    .engine
                    .label(split.label_id)
                    .map(|l| l.name.as_str())
                    .unwrap_or("?");
                println!(
                    "{}  {:>12}  {}",
                    split.id,
                    split.amount.format_with_symbol(&symbol),
                    name
                );
            }
            println!(
                "Unallocated: {} of {}",
                ws.engine.remainder(&txn.id)?.format_with_symbol(&symbol),
                txn.magnitude().format_with_symbol(&symbol)
            );
        }
    }

    Ok(())
}
