//! Batch window selection and order deduplication

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};

use super::error::PipelineError;
use crate::data::BatchManifest;
use crate::data::batches::load_orders;
use crate::data::types::RawOrder;

/// Orders of the selected batches, deduplicated by id
#[derive(Debug, Default)]
pub struct IngestedOrders {
    pub orders: Vec<RawOrder>,
    pub files_selected: usize,
    pub orders_loaded: usize,
}

/// Start of the trailing ingestion window
pub fn window_cutoff(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(window_days))
}

/// Load and deduplicate the orders of every batch inside the window.
///
/// Fails with [`PipelineError::NoBatches`] when `raw_dir` holds no batch
/// files at all; an empty window is not an error.
pub fn collect_orders(
    raw_dir: &Path,
    cutoff: DateTime<Utc>,
    include_undated: bool,
) -> Result<IngestedOrders, PipelineError> {
    let manifest = BatchManifest::scan(raw_dir)?;
    if manifest.is_empty() {
        return Err(PipelineError::NoBatches(raw_dir.to_path_buf()));
    }

    let selected = manifest.select(cutoff, include_undated);
    let loaded = load_orders(&selected);
    let orders_loaded = loaded.len();
    let orders = dedup_orders(loaded);

    tracing::info!(
        files = selected.len(),
        orders_loaded,
        unique_orders = orders.len(),
        "Loaded raw order batches"
    );

    Ok(IngestedOrders {
        orders,
        files_selected: selected.len(),
        orders_loaded,
    })
}

/// Keep the first occurrence of each order id; drop orders without an id.
pub fn dedup_orders(orders: Vec<RawOrder>) -> Vec<RawOrder> {
    let mut seen = HashSet::with_capacity(orders.len());
    let mut without_id = 0usize;
    let deduped: Vec<RawOrder> = orders
        .into_iter()
        .filter(|order| match order.id {
            Some(id) if id != 0 => seen.insert(id),
            _ => {
                without_id += 1;
                false
            }
        })
        .collect();

    if without_id > 0 {
        tracing::warn!(orders = without_id, "Dropped orders without an id");
    }
    deduped
}
