//! Report CLI commands

use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_month, Workspace};
use crate::error::{LabelbookError, LabelbookResult};
use crate::export::{export_label_transactions_csv, export_series_csv};
use crate::models::{AccountId, DateRange};
use crate::reports::{MonthlyOverview, TrendReport};

/// Report commands, flattened into the top level
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly trend for a label
    Trend {
        /// Label name or ID
        label: String,
        /// First month (YYYY-MM)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Last month (YYYY-MM)
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Write the monthly series as CSV to this file ("-" for stdout)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Income and bills for one month
    Overview {
        /// Year
        year: i32,
        /// Month (1-12)
        month: u32,
        /// Restrict to one account number
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Export a label's transactions as CSV
    Export {
        /// Label name or ID
        label: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn create_output(path: &PathBuf) -> LabelbookResult<File> {
    File::create(path).map_err(|e| {
        LabelbookError::Export(format!("Failed to create {}: {}", path.display(), e))
    })
}

/// Handle a report command
pub fn handle_report_command(ws: &Workspace, cmd: ReportCommands) -> LabelbookResult<()> {
    match cmd {
        ReportCommands::Trend {
            label,
            from,
            to,
            csv,
        } => {
            let label_id = ws.engine.find_label(&label)?.id;
            let range = match (from, to) {
                (Some(from), Some(to)) => Some(
                    DateRange::months(parse_month(Some(&from))?, parse_month(Some(&to))?)
                        .map_err(|e| LabelbookError::Validation(e.to_string()))?,
                ),
                _ => None,
            };

            let report = TrendReport::generate(&ws.engine, label_id, range)?;
            match csv {
                Some(path) if path.as_os_str() == "-" => {
                    export_series_csv(&report.series, io::stdout().lock())?
                }
                Some(path) => {
                    export_series_csv(&report.series, create_output(&path)?)?;
                    print!("{}", report.format_terminal());
                    println!("\nSeries written to {}", path.display());
                }
                None => print!("{}", report.format_terminal()),
            }
        }

        ReportCommands::Overview {
            year,
            month,
            account,
        } => {
            let account = account
                .or_else(|| ws.settings.default_account.clone())
                .map(AccountId::new);

            let overview =
                MonthlyOverview::generate(&ws.engine, year, month, account.as_ref())?;
            print!("{}", overview.format_terminal());
        }

        ReportCommands::Export { label, output } => {
            let label_id = ws.engine.find_label(&label)?.id;
            match output {
                Some(path) => {
                    export_label_transactions_csv(&ws.engine, label_id, create_output(&path)?)?;
                    println!("Exported to {}", path.display());
                }
                None => export_label_transactions_csv(&ws.engine, label_id, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}
