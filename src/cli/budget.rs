//! Budget CLI commands

use clap::Subcommand;

use super::{parse_money, parse_month, Workspace};
use crate::audit::{AuditEntry, EntityType};
use crate::error::LabelbookResult;
use crate::models::BudgetStatus;
use crate::reports::BudgetOverviewReport;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the monthly target for an expense label
    Set {
        /// Label name or ID
        label: String,
        /// Monthly target amount
        amount: String,
    },

    /// Remove a label's budget
    Remove {
        /// Label name or ID
        label: String,
    },

    /// Show one label's budget status for a month
    Status {
        /// Label name or ID
        label: String,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show every budgeted label for a month
    Overview {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(ws: &mut Workspace, cmd: BudgetCommands) -> LabelbookResult<()> {
    match cmd {
        BudgetCommands::Set { label, amount } => {
            let label = ws.engine.find_label(&label)?.clone();
            let target = parse_money(&amount)?;
            let before = ws.engine.budgets().get(label.id).cloned();

            ws.engine.set_budget(label.id, target)?;
            let after = ws.engine.budgets().get(label.id).cloned();
            let entry = match (&before, &after) {
                (Some(before), Some(after)) => Some(AuditEntry::update(
                    EntityType::Budget,
                    label.id.to_string(),
                    Some(label.name.clone()),
                    before,
                    after,
                )),
                (None, Some(after)) => Some(AuditEntry::create(
                    EntityType::Budget,
                    label.id.to_string(),
                    Some(label.name.clone()),
                    after,
                )),
                _ => None,
            };
            if let Some(entry) = entry {
                ws.record(entry);
            }

            println!(
                "Budget for '{}' set to {} per month",
                label.name,
                target.format_with_symbol(&ws.settings.currency_symbol)
            );
        }

        BudgetCommands::Remove { label } => {
            let label = ws.engine.find_label(&label)?.clone();
            let removed = ws.engine.remove_budget(label.id)?;
            ws.record(AuditEntry::delete(
                EntityType::Budget,
                label.id.to_string(),
                Some(label.name.clone()),
                &removed,
            ));

            println!("Removed budget for '{}'", label.name);
        }

        BudgetCommands::Status { label, month } => {
            let label = ws.engine.find_label(&label)?;
            let period = parse_month(month.as_deref())?;
            let symbol = &ws.settings.currency_symbol;
            match ws.engine.budget_status(label.id, period)? {
                BudgetStatus::Unbudgeted => {
                    println!("'{}' has no budget.", label.name);
                }
                BudgetStatus::Budgeted {
                    target,
                    actual,
                    remaining,
                } => {
                    println!("{}: {}", label.name, period.long_name());
                    println!("  Target:    {}", target.format_with_symbol(symbol));
                    println!("  Actual:    {}", actual.format_with_symbol(symbol));
                    println!("  Remaining: {}", remaining.format_with_symbol(symbol));
                    if remaining.is_negative() {
                        println!("  Overspent!");
                    }
                }
            }
        }

        BudgetCommands::Overview { month } => {
            let period = parse_month(month.as_deref())?;
            let report = BudgetOverviewReport::generate(&ws.engine, period)?;
            if report.rows.is_empty() {
                println!("No budgets set. Use 'labelbook budget set <LABEL> <AMOUNT>'.");
            } else {
                print!("{}", report.format_terminal());
            }
        }
    }

    Ok(())
}
