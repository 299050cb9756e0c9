use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::utils::file::expand_path;
use crate::utils::time::parse_timezone;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CHANNEL_MAP, DEFAULT_PROCESSED_DIR,
    DEFAULT_RAW_DIR, DEFAULT_RETENTION_DAYS, DEFAULT_TIMEZONE, DEFAULT_WINDOW_DAYS,
    LINE_ITEM_FILE_NAME, SALES_FACT_FILE_NAME,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Input/output locations
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PathsFileConfig {
    pub raw_dir: Option<String>,
    pub processed_dir: Option<String>,
    pub channel_map: Option<String>,
}

/// Batch selection and retention
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IngestFileConfig {
    pub window_days: Option<u32>,
    /// Keep batches whose file name timestamp does not parse
    pub include_undated: Option<bool>,
    pub retention_days: Option<u32>,
}

/// Normalization settings
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PipelineFileConfig {
    /// IANA timezone for calendar buckets
    pub timezone: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub paths: Option<PathsFileConfig>,
    pub ingest: Option<IngestFileConfig>,
    pub pipeline: Option<PipelineFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(paths) = other.paths {
            let current = self.paths.get_or_insert_with(PathsFileConfig::default);
            if paths.raw_dir.is_some() {
                tracing::trace!(raw_dir = ?paths.raw_dir, "Merging paths.raw_dir");
                current.raw_dir = paths.raw_dir;
            }
            if paths.processed_dir.is_some() {
                tracing::trace!(processed_dir = ?paths.processed_dir, "Merging paths.processed_dir");
                current.processed_dir = paths.processed_dir;
            }
            if paths.channel_map.is_some() {
                tracing::trace!(channel_map = ?paths.channel_map, "Merging paths.channel_map");
                current.channel_map = paths.channel_map;
            }
        }

        if let Some(ingest) = other.ingest {
            let current = self.ingest.get_or_insert_with(IngestFileConfig::default);
            if ingest.window_days.is_some() {
                tracing::trace!(window_days = ?ingest.window_days, "Merging ingest.window_days");
                current.window_days = ingest.window_days;
            }
            if ingest.include_undated.is_some() {
                tracing::trace!(include_undated = ?ingest.include_undated, "Merging ingest.include_undated");
                current.include_undated = ingest.include_undated;
            }
            if ingest.retention_days.is_some() {
                tracing::trace!(retention_days = ?ingest.retention_days, "Merging ingest.retention_days");
                current.retention_days = ingest.retention_days;
            }
        }

        if let Some(pipeline) = other.pipeline {
            let current = self.pipeline.get_or_insert_with(PipelineFileConfig::default);
            if pipeline.timezone.is_some() {
                tracing::trace!(timezone = ?pipeline.timezone, "Merging pipeline.timezone");
                current.timezone = pipeline.timezone;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Resolved input/output locations (absolute)
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub channel_map: PathBuf,
}

impl PathsConfig {
    /// Incrementally merged sales fact table
    pub fn sales_fact_table(&self) -> PathBuf {
        self.processed_dir.join(SALES_FACT_FILE_NAME)
    }

    /// Line-item snapshot table
    pub fn line_item_table(&self) -> PathBuf {
        self.processed_dir.join(LINE_ITEM_FILE_NAME)
    }
}

/// Batch selection and retention (final/runtime)
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub window_days: u32,
    pub include_undated: bool,
    pub retention_days: u32,
}

/// Normalization settings (final/runtime)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub timezone: Tz,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub ingest: IngestConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.orderfact/orderfact.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::resolve(cli, file_config)
    }

    /// Layer defaults -> file config -> CLI/env overrides, then validate
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_paths = file_config.paths.unwrap_or_default();
        let file_ingest = file_config.ingest.unwrap_or_default();
        let file_pipeline = file_config.pipeline.unwrap_or_default();

        let raw_dir = cli
            .raw_dir
            .clone()
            .or(file_paths.raw_dir)
            .unwrap_or_else(|| DEFAULT_RAW_DIR.to_string());
        let processed_dir = cli
            .processed_dir
            .clone()
            .or(file_paths.processed_dir)
            .unwrap_or_else(|| DEFAULT_PROCESSED_DIR.to_string());
        let channel_map = cli
            .channel_map
            .clone()
            .or(file_paths.channel_map)
            .unwrap_or_else(|| DEFAULT_CHANNEL_MAP.to_string());

        let window_days = cli
            .window_days
            .or(file_ingest.window_days)
            .unwrap_or(DEFAULT_WINDOW_DAYS);
        // Fail-open: undated batches are kept unless explicitly disabled
        let include_undated = cli
            .include_undated
            .or(file_ingest.include_undated)
            .unwrap_or(true);
        let retention_days = cli
            .retention_days
            .or(file_ingest.retention_days)
            .unwrap_or(DEFAULT_RETENTION_DAYS);

        let timezone_name = cli
            .timezone
            .clone()
            .or(file_pipeline.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = parse_timezone(&timezone_name).with_context(|| {
            format!(
                "Configuration error: pipeline.timezone '{}' is not a known IANA timezone",
                timezone_name
            )
        })?;

        let config = Self {
            paths: PathsConfig {
                raw_dir: expand_path(&raw_dir),
                processed_dir: expand_path(&processed_dir),
                channel_map: expand_path(&channel_map),
            },
            ingest: IngestConfig {
                window_days,
                include_undated,
                retention_days,
            },
            pipeline: PipelineConfig { timezone },
        };

        config.validate()?;

        tracing::debug!(
            raw_dir = %config.paths.raw_dir.display(),
            processed_dir = %config.paths.processed_dir.display(),
            channel_map = %config.paths.channel_map.display(),
            window_days = config.ingest.window_days,
            include_undated = config.ingest.include_undated,
            retention_days = config.ingest.retention_days,
            timezone = %config.pipeline.timezone,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.ingest.window_days == 0 {
            anyhow::bail!("Configuration error: ingest.window_days must be greater than 0");
        }

        if self.ingest.retention_days == 0 {
            anyhow::bail!("Configuration error: ingest.retention_days must be greater than 0");
        }

        if self.paths.raw_dir == self.paths.processed_dir {
            anyhow::bail!(
                "Configuration error: paths.raw_dir and paths.processed_dir cannot be the same ({})",
                self.paths.raw_dir.display()
            );
        }

        // Pruning inside the ingestion window would delete batches the next run still reads
        if self.ingest.retention_days < self.ingest.window_days {
            tracing::warn!(
                retention_days = self.ingest.retention_days,
                window_days = self.ingest.window_days,
                "ingest.retention_days is shorter than ingest.window_days"
            );
        }

        if !self.ingest.include_undated {
            tracing::debug!("Batches without a parseable file name timestamp will be skipped");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.orderfact/orderfact.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> FileConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_file_config_parse_full() {
        let config = parse(
            r#"{
                "paths": { "raw_dir": "/srv/raw", "processed_dir": "/srv/out", "channel_map": "/srv/map.csv" },
                "ingest": { "window_days": 14, "include_undated": false, "retention_days": 60 },
                "pipeline": { "timezone": "Europe/Berlin" }
            }"#,
        );

        let paths = config.paths.unwrap();
        assert_eq!(paths.raw_dir.as_deref(), Some("/srv/raw"));
        assert_eq!(paths.channel_map.as_deref(), Some("/srv/map.csv"));
        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.window_days, Some(14));
        assert_eq!(ingest.include_undated, Some(false));
        assert_eq!(ingest.retention_days, Some(60));
        assert_eq!(
            config.pipeline.unwrap().timezone.as_deref(),
            Some("Europe/Berlin")
        );
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config = parse("{}");
        assert!(config.paths.is_none());
        assert!(config.ingest.is_none());
        assert!(config.pipeline.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let config = parse(r#"{ "ingest": {}, "slack_webhook": "x" }"#);
        match &config.extra {
            serde_json::Value::Object(map) => assert!(map.contains_key("slack_webhook")),
            other => panic!("unexpected extra: {:?}", other),
        }
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = parse(
            r#"{ "paths": { "raw_dir": "/a", "processed_dir": "/b" }, "ingest": { "window_days": 10 } }"#,
        );
        let overlay = parse(r#"{ "paths": { "raw_dir": "/c" }, "ingest": { "retention_days": 45 } }"#);
        base.merge(overlay);

        let paths = base.paths.unwrap();
        assert_eq!(paths.raw_dir.as_deref(), Some("/c"));
        assert_eq!(paths.processed_dir.as_deref(), Some("/b"));
        let ingest = base.ingest.unwrap();
        assert_eq!(ingest.window_days, Some(10));
        assert_eq!(ingest.retention_days, Some(45));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default()).unwrap();
        assert_eq!(config.ingest.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(config.ingest.retention_days, DEFAULT_RETENTION_DAYS);
        assert!(config.ingest.include_undated);
        assert_eq!(config.pipeline.timezone, chrono_tz::America::New_York);
        assert!(config.paths.raw_dir.ends_with(DEFAULT_RAW_DIR));
        assert!(
            config
                .paths
                .sales_fact_table()
                .ends_with("data/processed/sales_by_sku_channel_date.csv")
        );
        assert!(config.paths.line_item_table().ends_with(LINE_ITEM_FILE_NAME));
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let cli = CliConfig {
            raw_dir: Some("/cli/raw".to_string()),
            window_days: Some(7),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        };
        let file = parse(
            r#"{ "paths": { "raw_dir": "/file/raw" }, "ingest": { "window_days": 20, "include_undated": false } }"#,
        );
        let config = AppConfig::resolve(&cli, file).unwrap();
        assert_eq!(config.paths.raw_dir, PathBuf::from("/cli/raw"));
        assert_eq!(config.ingest.window_days, 7);
        assert!(!config.ingest.include_undated);
        assert_eq!(config.pipeline.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_resolve_rejects_unknown_timezone() {
        let cli = CliConfig {
            timezone: Some("Nowhere/Special".to_string()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Nowhere/Special"));
    }

    #[test]
    fn test_validation_zero_window() {
        let cli = CliConfig {
            window_days: Some(0),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("window_days"));
    }

    #[test]
    fn test_validation_same_dirs() {
        let cli = CliConfig {
            raw_dir: Some("/srv/data".to_string()),
            processed_dir: Some("/srv/data".to_string()),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_load_missing_config_file_errors() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/orderfact.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(
            &path,
            r#"{ "paths": { "raw_dir": "/x/raw", "processed_dir": "/x/out" }, "ingest": { "window_days": 3 } }"#,
        )
        .unwrap();
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.paths.raw_dir, PathBuf::from("/x/raw"));
        assert_eq!(config.ingest.window_days, 3);
    }
}
