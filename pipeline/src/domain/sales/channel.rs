//! Traffic source -> sales channel classification

use std::collections::HashMap;

use crate::data::ChannelMapping;

pub const DEFAULT_CHANNEL: &str = "Shopify";
pub const DEFAULT_SUB_CHANNEL: &str = "Online Store";

/// Channel and sub-channel assigned to an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAssignment {
    pub channel: String,
    pub sub_channel: String,
}

impl Default for ChannelAssignment {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            sub_channel: DEFAULT_SUB_CHANNEL.to_string(),
        }
    }
}

/// Lookup keyed by lower-cased source name
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    entries: HashMap<String, ChannelAssignment>,
}

impl ChannelMap {
    /// Build from mapping rows. The first row for a source key wins.
    pub fn new(rows: Vec<ChannelMapping>) -> Self {
        let mut entries = HashMap::with_capacity(rows.len());
        for row in rows {
            let key = row.source_key.to_lowercase();
            if entries.contains_key(&key) {
                tracing::debug!(source_key = %key, "Duplicate channel mapping ignored");
                continue;
            }
            entries.insert(
                key,
                ChannelAssignment {
                    channel: row.channel,
                    sub_channel: row.sub_channel,
                },
            );
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower-cased lookup key of a raw source name
    pub fn source_key(source_name: &str) -> String {
        source_name.to_lowercase()
    }

    /// Assignment for `source_name`, or the default online store channel
    pub fn classify(&self, source_name: &str) -> ChannelAssignment {
        self.entries
            .get(&Self::source_key(source_name))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(key: &str, channel: &str, sub: &str) -> ChannelMapping {
        ChannelMapping {
            source_key: key.to_string(),
            channel: channel.to_string(),
            sub_channel: sub.to_string(),
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let map = ChannelMap::new(vec![mapping("pos", "Retail", "POS")]);
        assert_eq!(
            map.classify("POS"),
            ChannelAssignment {
                channel: "Retail".to_string(),
                sub_channel: "POS".to_string(),
            }
        );
    }

    #[test]
    fn test_unmapped_source_defaults() {
        let map = ChannelMap::new(vec![mapping("pos", "Retail", "POS")]);
        assert_eq!(map.classify("web"), ChannelAssignment::default());
        assert_eq!(map.classify(""), ChannelAssignment::default());
        assert_eq!(ChannelMap::default().classify("pos").channel, "Shopify");
    }

    #[test]
    fn test_first_duplicate_wins() {
        let map = ChannelMap::new(vec![
            mapping("tiktok", "Social", "TikTok Shop"),
            mapping("TikTok", "Marketplace", "Other"),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.classify("tiktok").channel, "Social");
    }
}
