// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "OrderFact";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "orderfact";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".orderfact";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "orderfact.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "ORDERFACT_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "ORDERFACT_LOG";

// =============================================================================
// Environment Variables - Paths
// =============================================================================

/// Directory holding raw `orders_<timestamp>.json` batches
pub const ENV_RAW_DIR: &str = "ORDERFACT_RAW_DIR";

/// Directory receiving the processed tables
pub const ENV_PROCESSED_DIR: &str = "ORDERFACT_PROCESSED_DIR";

/// Channel mapping CSV
pub const ENV_CHANNEL_MAP: &str = "ORDERFACT_CHANNEL_MAP";

// =============================================================================
// Environment Variables - Ingestion
// =============================================================================

pub const ENV_WINDOW_DAYS: &str = "ORDERFACT_WINDOW_DAYS";
pub const ENV_INCLUDE_UNDATED: &str = "ORDERFACT_INCLUDE_UNDATED";
pub const ENV_RETENTION_DAYS: &str = "ORDERFACT_RETENTION_DAYS";

/// Business timezone used for calendar buckets
pub const ENV_TIMEZONE: &str = "ORDERFACT_TIMEZONE";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_RAW_DIR: &str = "data/raw/shopify";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_CHANNEL_MAP: &str = "data/reference/channel_map.csv";

/// Trailing ingestion window in days
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Raw batches older than this are removed by `batches prune`
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

pub const DEFAULT_TIMEZONE: &str = "America/New_York";

// =============================================================================
// Batch Files
// =============================================================================

pub const BATCH_FILE_PREFIX: &str = "orders_";
pub const BATCH_FILE_EXTENSION: &str = "json";

/// Capture timestamp embedded in batch file names (UTC)
pub const BATCH_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

// =============================================================================
// Output Tables
// =============================================================================

/// Incrementally merged sales fact table
pub const SALES_FACT_FILE_NAME: &str = "sales_by_sku_channel_date.csv";

/// Per-run line-item snapshot (overwritten every run)
pub const LINE_ITEM_FILE_NAME: &str = "shopify_line_items.csv";
