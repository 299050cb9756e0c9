//! Core application

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};

use crate::core::cli::{self, BatchCommands, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::notify::{LogNotifier, Notifier, RunEvent};
use crate::data::BatchManifest;
use crate::data::batches::prune_batches;
use crate::data::tables::read_facts;
use crate::domain::sales::report::{channel_summary, format_channel_summary, kpi_summary};
use crate::domain::sales::{PipelineSettings, RunOutcome, SalesPipeline};
use crate::utils::time::format_batch_timestamp;

pub struct CoreApp {
    pub config: AppConfig,
    pub pipeline: SalesPipeline,
    notifier: Box<dyn Notifier>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Batches { command }) => {
                let config = AppConfig::load(&cli_config)?;
                Self::handle_batch_command(command, &config)
            }
            Some(Commands::Summary { date }) => Self::init(&cli_config)?.print_summary(date),
            Some(Commands::Run) | None => Self::init(&cli_config)?.refresh(),
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let pipeline = SalesPipeline::new(PipelineSettings::from(&config));
        Ok(Self {
            config,
            pipeline,
            notifier: Box::new(LogNotifier),
        })
    }

    /// Refresh the processed tables and report the outcome
    fn refresh(&self) -> Result<()> {
        let started = Instant::now();
        tracing::info!(
            raw_dir = %self.config.paths.raw_dir.display(),
            processed_dir = %self.config.paths.processed_dir.display(),
            "Starting sales refresh"
        );

        match self.pipeline.run(Utc::now()) {
            Ok(RunOutcome::Completed(report)) => {
                self.notifier.notify(&RunEvent::Succeeded {
                    line_items: report.line_items,
                    facts: report.facts,
                    total_rows: report.merge.total_rows(),
                    elapsed: started.elapsed(),
                });
                Ok(())
            }
            Ok(RunOutcome::Skipped { .. }) => {
                self.notifier.notify(&RunEvent::Skipped {
                    elapsed: started.elapsed(),
                });
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(&RunEvent::Failed {
                    error: e.to_string(),
                });
                Err(e).context("Sales refresh failed")
            }
        }
    }

    fn print_summary(&self, date: Option<NaiveDate>) -> Result<()> {
        let today = date.unwrap_or_else(|| {
            Utc::now()
                .with_timezone(&self.config.pipeline.timezone)
                .date_naive()
        });
        let path = self.config.paths.sales_fact_table();
        let facts = read_facts(&path)
            .with_context(|| format!("Failed to read sales fact table: {}", path.display()))?;

        println!("{}", kpi_summary(&facts, today));
        println!("Cumulative revenue by channel");
        print!("{}", format_channel_summary(&channel_summary(&facts)));
        Ok(())
    }

    fn handle_batch_command(cmd: BatchCommands, config: &AppConfig) -> Result<()> {
        match cmd {
            BatchCommands::Prune { yes } => Self::prune_raw_batches(yes, config),
        }
    }

    fn prune_raw_batches(skip_confirm: bool, config: &AppConfig) -> Result<()> {
        let raw_dir = &config.paths.raw_dir;
        let manifest = BatchManifest::scan(raw_dir)
            .with_context(|| format!("Failed to list raw batches: {}", raw_dir.display()))?;
        let cutoff = Utc::now() - Duration::days(i64::from(config.ingest.retention_days));
        let expired = manifest.expired(cutoff);

        if expired.is_empty() {
            println!(
                "Nothing to prune. No batches captured before {} in {}",
                format_batch_timestamp(cutoff),
                raw_dir.display()
            );
            return Ok(());
        }

        println!(
            "This will permanently delete {} raw batch file(s) captured before {}:",
            expired.len(),
            format_batch_timestamp(cutoff)
        );
        for entry in &expired {
            println!("  {}", entry.path.display());
        }

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        let deleted = prune_batches(&manifest, cutoff)
            .with_context(|| format!("Failed to prune raw batches in {}", raw_dir.display()))?;
        tracing::info!(files = deleted.len(), "Pruned raw batches");
        println!("Pruned {} file(s) from {}", deleted.len(), raw_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
