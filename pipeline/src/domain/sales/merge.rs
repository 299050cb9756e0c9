//! Incremental merge of new facts into the persisted fact table
//!
//! ```text
//! persisted table ──▶ header check ──┬─ compatible ──▶ drop rows in [new_min, new_max]
//!                                    │                  ──▶ append new ──▶ dedup (keep last)
//!                                    └─ drift / unreadable / absent ──▶ new facts only
//! ```
//!
//! The result always replaces the file atomically.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::data::DataError;
use crate::data::schema::FACT_COLUMNS;
use crate::data::tables::{read_facts, write_table};
use crate::data::types::SalesFact;

/// Why the table was rebuilt from the new facts alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshReason {
    NoExistingTable,
    SchemaDrift(String),
    Unreadable(String),
}

impl fmt::Display for FreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoExistingTable => f.write_str("no existing table"),
            Self::SchemaDrift(detail) => write!(f, "schema drift ({})", detail),
            Self::Unreadable(detail) => write!(f, "existing table unreadable ({})", detail),
        }
    }
}

/// Which write path a merge took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Fresh {
        rows: usize,
        reason: FreshReason,
    },
    Merged {
        new_rows: usize,
        /// Persisted rows outside the new date range
        kept_rows: usize,
        /// Persisted rows inside the new date range, superseded by the new batch
        replaced_rows: usize,
        total_rows: usize,
    },
}

impl MergeOutcome {
    pub fn total_rows(&self) -> usize {
        match self {
            Self::Fresh { rows, .. } => *rows,
            Self::Merged { total_rows, .. } => *total_rows,
        }
    }
}

/// Combine persisted facts with a new batch.
///
/// Persisted rows dated inside the inclusive `[min, max]` range of the new
/// batch are dropped, the new rows are appended, and duplicates on
/// (date, channel, order_id, sku, sub_channel) keep their last occurrence.
pub fn merge_facts(existing: Vec<SalesFact>, new: &[SalesFact]) -> Vec<SalesFact> {
    let Some((new_min, new_max)) = date_range(new) else {
        return existing;
    };

    let mut combined: Vec<SalesFact> = existing
        .into_iter()
        .filter(|fact| fact.date < new_min || fact.date > new_max)
        .collect();
    combined.extend(new.iter().cloned());

    dedup_keep_last(combined)
}

fn date_range(facts: &[SalesFact]) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    let min = facts.iter().map(|f| f.date).min()?;
    let max = facts.iter().map(|f| f.date).max()?;
    Some((min, max))
}

fn dedup_keep_last(facts: Vec<SalesFact>) -> Vec<SalesFact> {
    let mut last_index = HashMap::with_capacity(facts.len());
    for (i, fact) in facts.iter().enumerate() {
        last_index.insert(fact.merge_key(), i);
    }

    facts
        .into_iter()
        .enumerate()
        .filter(|(i, fact)| last_index.get(&fact.merge_key()) == Some(i))
        .map(|(_, fact)| fact)
        .collect()
}

/// Merge `new` into the table at `path` and persist the result.
///
/// Only the final write can fail: any problem with the persisted table
/// itself falls back to writing the new facts alone.
pub fn merge_into_table(path: &Path, new: &[SalesFact]) -> Result<MergeOutcome, DataError> {
    let reason = if path.exists() {
        match read_facts(path) {
            Ok(existing) => {
                let range = date_range(new);
                let existing_rows = existing.len();
                let kept_rows = existing
                    .iter()
                    .filter(|f| range.is_none_or(|(lo, hi)| f.date < lo || f.date > hi))
                    .count();
                let merged = merge_facts(existing, new);
                write_table(path, &FACT_COLUMNS, &merged)?;
                return Ok(log_outcome(MergeOutcome::Merged {
                    new_rows: new.len(),
                    kept_rows,
                    replaced_rows: existing_rows - kept_rows,
                    total_rows: merged.len(),
                }));
            }
            Err(DataError::SchemaDrift { drift, .. }) => {
                tracing::warn!(
                    path = %path.display(),
                    drift = %drift,
                    "Existing fact table has an incompatible schema; rebuilding fresh"
                );
                FreshReason::SchemaDrift(drift.to_string())
            }
            Err(e) if e.is_not_found() => FreshReason::NoExistingTable,
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Existing fact table could not be merged; writing fresh"
                );
                FreshReason::Unreadable(e.to_string())
            }
        }
    } else {
        FreshReason::NoExistingTable
    };

    write_table(path, &FACT_COLUMNS, new)?;
    Ok(log_outcome(MergeOutcome::Fresh {
        rows: new.len(),
        reason,
    }))
}

fn log_outcome(outcome: MergeOutcome) -> MergeOutcome {
    match &outcome {
        MergeOutcome::Fresh { rows, reason } => {
            tracing::info!(rows, reason = %reason, "Wrote fresh sales fact table");
        }
        MergeOutcome::Merged {
            new_rows,
            kept_rows,
            replaced_rows,
            total_rows,
        } => {
            tracing::info!(
                new_rows,
                kept_rows,
                replaced_rows,
                total_rows,
                "Merged new facts into sales fact table"
            );
        }
    }
    outcome
}
