//! Channel mapping reference table
//!
//! CSV with header `source_key,channel,sub_channel`. Everything from a `#`
//! to the end of its line is a comment. Rows without a channel or
//! sub-channel are dropped.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::DataError;

/// One usable row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelMapping {
    #[serde(alias = "source", alias = "source_name")]
    pub source_key: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub sub_channel: String,
}

impl ChannelMapping {
    fn is_complete(&self) -> bool {
        !self.channel.is_empty() && !self.sub_channel.is_empty()
    }
}

/// Load the mapping rows from `path`.
///
/// A missing file is not an error: it is logged and yields no rows, so every
/// order falls back to the default channel.
pub fn load_channel_map(path: &Path) -> Result<Vec<ChannelMapping>, DataError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Channel map not found; using default channel for all orders");
            return Ok(Vec::new());
        }
        Err(e) => return Err(DataError::io(path, e)),
    };

    let stripped = strip_comments(&content);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(stripped.as_bytes());

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in reader.deserialize::<ChannelMapping>() {
        let mut mapping = record.map_err(|e| DataError::csv(path, e))?;
        if !mapping.is_complete() {
            dropped += 1;
            continue;
        }
        mapping.source_key = mapping.source_key.to_lowercase();
        rows.push(mapping);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        dropped,
        "Loaded channel map"
    );
    Ok(rows)
}

/// Cut each line at its first `#`; whole-line comments become blank lines
fn strip_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(data, _)| data))
        .collect::<Vec<_>>()
        .join("\n")
}
