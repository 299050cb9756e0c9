//! Raw order batch files
//!
//! Batches are JSON arrays of orders named `orders_<UTC timestamp>.json`.
//! The [`BatchManifest`] lists them sorted by file name with the embedded
//! capture time parsed, and drives both window selection and retention.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::types::RawOrder;
use crate::core::constants::{BATCH_FILE_EXTENSION, BATCH_FILE_PREFIX};
use crate::utils::time::parse_batch_timestamp;

/// One batch file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// `None` when the file name carries no parseable timestamp
    pub captured_at: Option<DateTime<Utc>>,
}

impl BatchEntry {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let stem = file_name
            .strip_prefix(BATCH_FILE_PREFIX)?
            .strip_suffix(BATCH_FILE_EXTENSION)?
            .strip_suffix('.')?;
        let captured_at = parse_batch_timestamp(stem);
        Some(Self {
            path,
            file_name,
            captured_at,
        })
    }
}

/// Sorted listing of the batch files in a directory
#[derive(Debug, Clone, Default)]
pub struct BatchManifest {
    entries: Vec<BatchEntry>,
}

impl BatchManifest {
    /// List `orders_*.json` files in `dir`. A missing directory yields an empty manifest.
    pub fn scan(dir: &Path) -> Result<Self, DataError> {
        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "Raw batch directory does not exist");
                return Ok(Self::default());
            }
            Err(e) => return Err(DataError::io(dir, e)),
        };

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| DataError::io(dir, e))?;
            let path = item.path();
            if !path.is_file() {
                continue;
            }
            if let Some(entry) = BatchEntry::from_path(path) {
                entries.push(entry);
            }
        }

        let manifest = Self::from_entries(entries);
        tracing::debug!(dir = %dir.display(), files = manifest.len(), "Scanned raw batches");
        Ok(manifest)
    }

    pub fn from_entries(mut entries: Vec<BatchEntry>) -> Self {
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Self { entries }
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries captured at or after `cutoff`, in file-name order.
    ///
    /// Undated entries are kept when `include_undated` is set; each inclusion
    /// or exclusion is logged.
    pub fn select(&self, cutoff: DateTime<Utc>, include_undated: bool) -> Vec<&BatchEntry> {
        self.entries
            .iter()
            .filter(|entry| match entry.captured_at {
                Some(captured_at) => captured_at >= cutoff,
                None if include_undated => {
                    tracing::warn!(
                        file = %entry.file_name,
                        "Batch file name has no parseable timestamp; including it"
                    );
                    true
                }
                None => {
                    tracing::warn!(
                        file = %entry.file_name,
                        "Batch file name has no parseable timestamp; skipping it"
                    );
                    false
                }
            })
            .collect()
    }

    /// Dated entries captured before `cutoff`. Undated entries never expire.
    pub fn expired(&self, cutoff: DateTime<Utc>) -> Vec<&BatchEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.captured_at.is_some_and(|ts| ts < cutoff))
            .collect()
    }
}

/// Read one batch file as a JSON array of orders.
///
/// Each element is decoded on its own: a malformed order is logged and
/// skipped without discarding the rest of the file.
pub fn read_batch(path: &Path) -> Result<Vec<RawOrder>, DataError> {
    let content = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    let values: Vec<JsonValue> =
        serde_json::from_str(&content).map_err(|e| DataError::json(path, e))?;

    let mut orders = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawOrder>(value) {
            Ok(order) => orders.push(order),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    error = %e,
                    "Malformed order in batch file; skipping it"
                );
            }
        }
    }
    Ok(orders)
}

/// Concatenate the orders of `entries` in order, skipping unreadable files
pub fn load_orders(entries: &[&BatchEntry]) -> Vec<RawOrder> {
    let mut orders = Vec::new();
    for entry in entries {
        match read_batch(&entry.path) {
            Ok(batch) => {
                tracing::trace!(file = %entry.file_name, orders = batch.len(), "Loaded batch");
                orders.extend(batch);
            }
            Err(e) => {
                tracing::warn!(file = %entry.file_name, error = %e, "Could not read batch file; skipping");
            }
        }
    }
    orders
}

/// Delete batch files captured before `cutoff`. Returns the deleted entries.
pub fn prune_batches(
    manifest: &BatchManifest,
    cutoff: DateTime<Utc>,
) -> Result<Vec<BatchEntry>, DataError> {
    let mut deleted = Vec::new();
    for entry in manifest.expired(cutoff) {
        fs::remove_file(&entry.path).map_err(|e| DataError::io(&entry.path, e))?;
        tracing::debug!(file = %entry.file_name, "Deleted expired batch");
        deleted.push(entry.clone());
    }
    Ok(deleted)
}
