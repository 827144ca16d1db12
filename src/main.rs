use anyhow::Result;
use clap::{Parser, Subcommand};

use labelbook::audit::AuditQuery;
use labelbook::cli::{
    handle_budget_command, handle_config_command, handle_label_command, handle_report_command,
    handle_rule_command, handle_split_command, handle_transaction_command, BudgetCommands,
    ConfigCommands, LabelCommands, ReportCommands, RuleCommands, SplitCommands,
    TransactionCommands, Workspace,
};
use labelbook::config::LabelbookPaths;

#[derive(Parser)]
#[command(
    name = "labelbook",
    version,
    about = "Rule-based transaction labeling, splitting and budget tracking",
    long_about = "labelbook imports bank statements, assigns labels to transactions \
                  with match rules or by hand, splits expenses across labels, and \
                  reports monthly trends and budget status."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Label management commands
    #[command(subcommand)]
    Label(LabelCommands),

    /// Match rule commands
    #[command(subcommand)]
    Rule(RuleCommands),

    /// Transaction commands
    #[command(subcommand, alias = "transaction")]
    Tx(TransactionCommands),

    /// Split commands
    #[command(subcommand)]
    Split(SplitCommands),

    /// Budget commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    #[command(flatten)]
    Report(ReportCommands),

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Only changes to this label, its rules, splits and assignments
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

fn main() -> Result<()> {
    labelbook::init_tracing();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("labelbook - rule-based transaction labeling");
        println!();
        println!("Run 'labelbook --help' for usage information.");
        return Ok(());
    };

    let paths = LabelbookPaths::new()?;
    let mut ws = Workspace::open(paths)?;

    match command {
        Commands::Label(cmd) => handle_label_command(&mut ws, cmd)?,
        Commands::Rule(cmd) => handle_rule_command(&mut ws, cmd)?,
        Commands::Tx(cmd) => handle_transaction_command(&mut ws, cmd)?,
        Commands::Split(cmd) => handle_split_command(&mut ws, cmd)?,
        Commands::Budget(cmd) => handle_budget_command(&mut ws, cmd)?,
        Commands::Report(cmd) => handle_report_command(&ws, cmd)?,
        Commands::History { limit, label } => {
            let mut query = AuditQuery::recent(limit);
            if let Some(label) = label {
                query = query.for_label(ws.engine.find_label(&label)?.id);
            }
            let entries = ws.audit().query(&query)?;
            if entries.is_empty() {
                println!("No changes recorded yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Commands::Config { command } => {
            handle_config_command(&mut ws, command.unwrap_or(ConfigCommands::Show))?
        }
    }

    ws.commit()?;
    Ok(())
}
