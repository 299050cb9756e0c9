//! Sales Fact Pipeline
//!
//! Runs one synchronous refresh of the processed tables:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────────┐
//! │                          SALES FACT PIPELINE                               │
//! ├────────────────────────────────────────────────────────────────────────────┤
//! │                                                                            │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//! │  │1. INGEST │──▶│2. FLATTEN│──▶│3. AGGR.  │──▶│4. MERGE  │──▶│5.SNAPSHOT│  │
//! │  │          │   │          │   │          │   │          │   │          │  │
//! │  │ Manifest │   │ Geo      │   │ 14-field │   │ Drift    │   │ Line     │  │
//! │  │ Window   │   │ Channel  │   │ key      │   │ Window   │   │ items    │  │
//! │  │ Dedup    │   │ Refunds  │   │ Derived  │   │ Dedup    │   │ CSV      │  │
//! │  └──────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘  │
//! │                                                                            │
//! └────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Stage       | Input                 | Output                | Module         |
//! |-------------|-----------------------|-----------------------|----------------|
//! | 1. Ingest   | raw batch directory   | `Vec<RawOrder>`       | `ingest.rs`    |
//! | 2. Flatten  | `&[RawOrder]`         | `Vec<LineItemRow>`    | `flatten.rs`   |
//! | 3. Aggregate| `&[LineItemRow]`      | `Vec<SalesFact>`      | `aggregate.rs` |
//! | 4. Merge    | `&[SalesFact]`        | `MergeOutcome`        | `merge.rs`     |
//! | 5. Snapshot | `&[LineItemRow]`      | line-item CSV         | `data::tables` |
//!
//! When flattening yields no line items, stages 3-5 are skipped and the
//! existing tables are left untouched.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::aggregate::aggregate_facts;
use super::channel::ChannelMap;
use super::error::PipelineError;
use super::flatten::Flattener;
use super::geo::GeoResolver;
use super::ingest::{collect_orders, window_cutoff};
use super::merge::{MergeOutcome, merge_into_table};
use crate::core::config::AppConfig;
use crate::data::channel_map::load_channel_map;
use crate::data::schema::LINE_ITEM_COLUMNS;
use crate::data::tables::write_table;

/// Inputs of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub raw_dir: PathBuf,
    pub channel_map: PathBuf,
    pub sales_fact_table: PathBuf,
    pub line_item_table: PathBuf,
    pub window_days: u32,
    pub include_undated: bool,
    pub timezone: Tz,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            raw_dir: config.paths.raw_dir.clone(),
            channel_map: config.paths.channel_map.clone(),
            sales_fact_table: config.paths.sales_fact_table(),
            line_item_table: config.paths.line_item_table(),
            window_days: config.ingest.window_days,
            include_undated: config.ingest.include_undated,
            timezone: config.pipeline.timezone,
        }
    }
}

/// Counts of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub files_selected: usize,
    pub orders: usize,
    pub line_items: usize,
    pub facts: usize,
    pub merge: MergeOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// No line items in the window; nothing was written
    Skipped { orders: usize },
}

pub struct SalesPipeline {
    settings: PipelineSettings,
}

impl SalesPipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run all stages with the ingestion window ending at `now`.
    pub fn run(&self, now: DateTime<Utc>) -> Result<RunOutcome, PipelineError> {
        let settings = &self.settings;

        // Stage 1: ingest
        let cutoff = window_cutoff(now, settings.window_days);
        tracing::debug!(cutoff = %cutoff, window_days = settings.window_days, "Ingestion window");
        let ingested = collect_orders(&settings.raw_dir, cutoff, settings.include_undated)?;

        // Stage 2: flatten
        let channels = ChannelMap::new(load_channel_map(&settings.channel_map)?);
        tracing::debug!(mappings = channels.len(), "Channel map ready");
        let flattener = Flattener::new(GeoResolver::default(), &channels, settings.timezone);
        let rows = flattener.flatten_batch(&ingested.orders);

        if rows.is_empty() {
            tracing::info!(
                orders = ingested.orders.len(),
                "No line items found; skipping aggregation and table writes"
            );
            return Ok(RunOutcome::Skipped {
                orders: ingested.orders.len(),
            });
        }

        // Stage 3: aggregate
        let facts = aggregate_facts(&rows);

        // Stage 4: merge
        let merge = merge_into_table(&settings.sales_fact_table, &facts)?;

        // Stage 5: snapshot (always overwritten)
        write_table(&settings.line_item_table, &LINE_ITEM_COLUMNS, &rows)?;

        tracing::info!(
            facts = facts.len(),
            line_items = rows.len(),
            table_rows = merge.total_rows(),
            "Updated processed tables"
        );

        Ok(RunOutcome::Completed(RunReport {
            files_selected: ingested.files_selected,
            orders: ingested.orders.len(),
            line_items: rows.len(),
            facts: facts.len(),
            merge,
        }))
    }
}
