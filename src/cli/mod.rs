//! CLI Module
//!
//! Command-line front end for the booking wizard using Clap v4.

mod commands;
mod ui;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

pub use commands::load_config;

/// TNL Beauty appointment booking
#[derive(Parser, Debug)]
#[command(name = "tnl-booking")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (creates log files in .tnl-booking/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List treatments, add-ons, nail art levels and removals
    Services,

    /// Show bookable dates and their times
    Dates,

    /// Inspect or discard the saved draft booking
    Draft {
        #[command(subcommand)]
        operation: DraftCommands,
    },

    /// Update the draft and submit the booking
    Book(BookArgs),

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DraftCommands {
    /// Show the saved selection and its total
    Show,
    /// Discard the saved selection
    Clear,
}

/// Values merged into the saved draft before the wizard runs. Anything
/// left out keeps its saved value.
#[derive(Args, Debug, Default)]
pub struct BookArgs {
    /// Core treatment id (repeatable)
    #[arg(long = "service", value_name = "ID")]
    pub services: Vec<String>,

    /// Add-on id (repeatable)
    #[arg(long = "addon", value_name = "ID")]
    pub add_ons: Vec<String>,

    /// Removal id (repeatable)
    #[arg(long = "removal", value_name = "ID")]
    pub removals: Vec<String>,

    /// Nail art level id
    #[arg(long, value_name = "ID")]
    pub level: Option<String>,

    /// Appointment date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Appointment time (HH:MM)
    #[arg(long)]
    pub time: Option<String>,

    /// Your name
    #[arg(long)]
    pub name: Option<String>,

    /// Contact me by email
    #[arg(long, conflicts_with = "phone")]
    pub email: Option<String>,

    /// Contact me by phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Inspiration image to attach (max 2MB by default)
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Discard the saved draft before applying these values
    #[arg(long)]
    pub fresh: bool,
}

/// Main CLI entry point
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        Commands::Services => commands::cmd_services(),
        Commands::Dates => commands::cmd_dates(&config).await,
        Commands::Draft { operation } => commands::cmd_draft(&config, operation),
        Commands::Book(args) => commands::cmd_book(&config, args).await,
        Commands::Init { force } => commands::cmd_init(force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_book() {
        let cli = Cli::try_parse_from([
            "tnl-booking",
            "-d",
            "book",
            "--service",
            "gel-x",
            "--service",
            "gel-toes",
            "--addon",
            "chrome",
            "--date",
            "2024-06-10",
            "--time",
            "14:00",
            "--name",
            "Jess",
            "--email",
            "jess@example.com",
        ])
        .unwrap();

        assert!(cli.debug);
        let Commands::Book(args) = cli.command else {
            unreachable!("expected book");
        };
        assert_eq!(args.services, vec!["gel-x", "gel-toes"]);
        assert_eq!(args.add_ons, vec!["chrome"]);
        assert_eq!(args.date.as_deref(), Some("2024-06-10"));
        assert!(args.phone.is_none());
        assert!(!args.fresh);
    }

    #[test]
    fn test_email_and_phone_conflict() {
        let result = Cli::try_parse_from([
            "tnl-booking",
            "book",
            "--email",
            "jess@example.com",
            "--phone",
            "07700 900123",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_draft_clear() {
        let cli = Cli::try_parse_from(["tnl-booking", "draft", "clear", "-c", "custom.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Draft {
                operation: DraftCommands::Clear
            }
        ));
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }
}
