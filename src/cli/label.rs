//! Label CLI commands

use clap::Subcommand;

use super::Workspace;
use crate::audit::{AuditEntry, EntityType};
use crate::display::{format_label_details, format_label_list, format_transaction_register};
use crate::engine::LabelUpdate;
use crate::error::{LabelbookError, LabelbookResult};
use crate::models::{Label, LabelType};

/// Label subcommands
#[derive(Subcommand)]
pub enum LabelCommands {
    /// List all labels
    List {
        /// Only labels of this type (income, bill, expense)
        #[arg(short = 't', long = "type")]
        label_type: Option<String>,
    },

    /// Create a new label
    #[command(alias = "add")]
    Create {
        /// Label name
        name: String,
        /// Label type (income, bill, expense)
        #[arg(short = 't', long = "type", default_value = "expense")]
        label_type: String,
        /// Display color
        #[arg(long)]
        color: Option<String>,
        /// Payee alias shown for transactions carrying this label
        #[arg(long)]
        alias: Option<String>,
    },

    /// Show label details and rules
    Show {
        /// Label name or ID
        label: String,
    },

    /// Edit a label
    Edit {
        /// Label name or ID
        label: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New type
        #[arg(short = 't', long = "type")]
        label_type: Option<String>,
        /// New color
        #[arg(long, conflicts_with = "clear_color")]
        color: Option<String>,
        /// Remove the color
        #[arg(long)]
        clear_color: bool,
        /// New payee alias
        #[arg(long, conflicts_with = "clear_alias")]
        alias: Option<String>,
        /// Remove the payee alias
        #[arg(long)]
        clear_alias: bool,
    },

    /// Rename a label
    Rename {
        /// Label name or ID
        label: String,
        /// New name
        new_name: String,
    },

    /// Delete a label with its assignments, splits and budget
    Delete {
        /// Label name or ID
        label: String,
    },

    /// List transactions carrying a label
    Transactions {
        /// Label name or ID
        label: String,
    },
}

fn parse_type(input: &str) -> LabelbookResult<LabelType> {
    input.parse().map_err(LabelbookError::Validation)
}

/// Handle a label command
pub fn handle_label_command(ws: &mut Workspace, cmd: LabelCommands) -> LabelbookResult<()> {
    match cmd {
        LabelCommands::List { label_type } => {
            let labels = match label_type {
                Some(t) => ws.engine.labels_of_type(parse_type(&t)?),
                None => ws.engine.labels(),
            };
            println!("{}", format_label_list(&ws.engine, &labels));
        }

        LabelCommands::Create {
            name,
            label_type,
            color,
            alias,
        } => {
            let mut label = Label::new(name, parse_type(&label_type)?);
            if let Some(color) = color {
                label = label.with_color(color);
            }
            if let Some(alias) = alias {
                label = label.with_alias(alias);
            }

            let id = ws.engine.create_label(label)?;
            let label = ws.engine.registry().require(id)?.clone();
            let assigned = ws.engine.assignments().transactions_for(id).len();
            ws.record(AuditEntry::create(
                EntityType::Label,
                id.to_string(),
                Some(label.name.clone()),
                &label,
            ));

            println!("Created label: {}", label.name);
            println!("  Type: {}", label.label_type);
            println!("  ID: {}", id);
            if assigned > 0 {
                println!("  Matched {} transactions", assigned);
            }
        }

        LabelCommands::Show { label } => {
            let label = ws.engine.find_label(&label)?;
            print!("{}", format_label_details(&ws.engine, label));
        }

        LabelCommands::Edit {
            label,
            name,
            label_type,
            color,
            clear_color,
            alias,
            clear_alias,
        } => {
            let update = LabelUpdate {
                name,
                label_type: label_type.as_deref().map(parse_type).transpose()?,
                color: if clear_color { Some(None) } else { color.map(Some) },
                alias: if clear_alias { Some(None) } else { alias.map(Some) },
            };
            if update.is_empty() {
                println!("No changes specified. Use --name, --type, --color or --alias.");
                return Ok(());
            }

            let before = ws.engine.find_label(&label)?.clone();
            ws.engine.update_label(before.id, update)?;
            let after = ws.engine.registry().require(before.id)?.clone();
            ws.record(AuditEntry::update(
                EntityType::Label,
                after.id.to_string(),
                Some(after.name.clone()),
                &before,
                &after,
            ));

            println!("Updated label: {}", after.name);
        }

        LabelCommands::Rename { label, new_name } => {
            let before = ws.engine.find_label(&label)?.clone();
            ws.engine.rename_label(before.id, &new_name)?;
            let after = ws.engine.registry().require(before.id)?.clone();
            ws.record(AuditEntry::update(
                EntityType::Label,
                after.id.to_string(),
                Some(after.name.clone()),
                &before,
                &after,
            ));

            println!("Renamed '{}' to '{}'", before.name, after.name);
        }

        LabelCommands::Delete { label } => {
            let id = ws.engine.find_label(&label)?.id;
            let removed = ws.engine.delete_label(id)?;
            ws.record(AuditEntry::delete(
                EntityType::Label,
                id.to_string(),
                Some(removed.name.clone()),
                &removed,
            ));

            println!("Deleted label: {}", removed.name);
        }

        LabelCommands::Transactions { label } => {
            let id = ws.engine.find_label(&label)?.id;
            let transactions = ws.engine.transactions_with_label(id)?;
            print!(
                "{}",
                format_transaction_register(&ws.engine, &ws.settings, &transactions)
            );
        }
    }

    Ok(())
}
