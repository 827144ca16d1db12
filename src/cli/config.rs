//! Configuration CLI commands

use clap::Subcommand;

use super::Workspace;
use crate::error::LabelbookResult;

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration and paths
    Show,

    /// Set a setting (currency_symbol, date_format, import_date_format, default_account)
    Set {
        key: String,
        value: String,
    },

    /// Set or clear the display name of an account
    Alias {
        /// Account number
        account: String,
        /// Display name (omit to clear)
        alias: Option<String>,
    },
}

/// Handle a config command
pub fn handle_config_command(ws: &mut Workspace, cmd: ConfigCommands) -> LabelbookResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("labelbook Configuration");
            println!("=======================");
            println!("Base directory:   {}", ws.paths.base_dir().display());
            println!("Data directory:   {}", ws.paths.data_dir().display());
            println!("Audit log:        {}", ws.paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  currency_symbol:    {}", ws.settings.currency_symbol);
            println!("  date_format:        {}", ws.settings.date_format);
            println!("  import_date_format: {}", ws.settings.import_date_format);
            println!(
                "  default_account:    {}",
                ws.settings.default_account.as_deref().unwrap_or("(none)")
            );
            if !ws.settings.account_aliases.is_empty() {
                println!();
                println!("Account aliases:");
                for (account, alias) in &ws.settings.account_aliases {
                    println!("  {} = {}", account, alias);
                }
            }
        }

        ConfigCommands::Set { key, value } => {
            ws.settings.set_value(&key, &value)?;
            ws.settings.save(&ws.paths)?;
            println!("Set {} = {}", key, value);
        }

        ConfigCommands::Alias { account, alias } => {
            ws.settings.set_account_alias(&account, alias.as_deref());
            ws.settings.save(&ws.paths)?;
            match alias {
                Some(alias) => println!("Account {} is now shown as '{}'", account, alias),
                None => println!("Cleared alias for account {}", account),
            }
        }
    }

    Ok(())
}
