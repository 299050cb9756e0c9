use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CHANNEL_MAP, ENV_CONFIG, ENV_INCLUDE_UNDATED, ENV_PROCESSED_DIR, ENV_RAW_DIR,
    ENV_RETENTION_DAYS, ENV_TIMEZONE, ENV_WINDOW_DAYS,
};

#[derive(Parser)]
#[command(name = "orderfact")]
#[command(version, about = "Order normalization and daily sales fact builder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Directory with raw orders_<timestamp>.json batches
    #[arg(long, global = true, env = ENV_RAW_DIR)]
    pub raw_dir: Option<String>,

    /// Directory receiving the processed tables
    #[arg(long, global = true, env = ENV_PROCESSED_DIR)]
    pub processed_dir: Option<String>,

    /// Channel mapping CSV (source_key, channel, sub_channel)
    #[arg(long, global = true, env = ENV_CHANNEL_MAP)]
    pub channel_map: Option<String>,

    /// Trailing ingestion window in days
    #[arg(long, global = true, env = ENV_WINDOW_DAYS)]
    pub window_days: Option<u32>,

    /// Include batches whose file name carries no parseable timestamp
    #[arg(long, global = true, env = ENV_INCLUDE_UNDATED)]
    pub include_undated: Option<bool>,

    /// Raw batch retention in days (used by `batches prune`)
    #[arg(long, global = true, env = ENV_RETENTION_DAYS)]
    pub retention_days: Option<u32>,

    /// Business timezone for calendar buckets (IANA name)
    #[arg(long, global = true, env = ENV_TIMEZONE)]
    pub timezone: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Build the line-item snapshot and merge the sales fact table (default command)
    Run,
    /// Print KPI and per-channel summaries of the persisted fact table
    Summary {
        /// Business-local "today" (defaults to the current date in the business timezone)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Raw batch maintenance commands
    Batches {
        #[command(subcommand)]
        command: BatchCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum BatchCommands {
    /// Delete raw batches older than the retention window. Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub raw_dir: Option<String>,
    pub processed_dir: Option<String>,
    pub channel_map: Option<String>,
    pub window_days: Option<u32>,
    pub include_undated: Option<bool>,
    pub retention_days: Option<u32>,
    pub timezone: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        raw_dir: cli.raw_dir,
        processed_dir: cli.processed_dir,
        channel_map: cli.channel_map,
        window_days: cli.window_days,
        include_undated: cli.include_undated,
        retention_days: cli.retention_days,
        timezone: cli.timezone,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_no_command() {
        let cli = Cli::try_parse_from(["orderfact"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.window_days.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "orderfact",
            "run",
            "--window-days",
            "7",
            "--timezone",
            "Europe/Berlin",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.window_days, Some(7));
        assert_eq!(cli.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn test_parse_summary_date() {
        let cli = Cli::try_parse_from(["orderfact", "summary", "--date", "2024-03-05"]).unwrap();
        match cli.command {
            Some(Commands::Summary { date }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_batches_prune() {
        let cli = Cli::try_parse_from(["orderfact", "batches", "prune", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Batches {
                command: BatchCommands::Prune { yes: true }
            })
        ));
    }

    #[test]
    fn test_invalid_window_rejected() {
        assert!(Cli::try_parse_from(["orderfact", "--window-days", "soon"]).is_err());
    }
}
