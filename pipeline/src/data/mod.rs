//! File-backed data layer
//!
//! - `batches` - raw order batch discovery, loading and retention
//! - `channel_map` - channel mapping reference table
//! - `tables` - CSV table reads and atomic writes
//! - `schema` - column contracts and header validation
//! - `types` - order payload and table row types
//! - `error` - unified error type

pub mod batches;
pub mod channel_map;
pub mod error;
pub mod schema;
pub mod tables;
pub mod types;

pub use batches::{BatchEntry, BatchManifest};
pub use channel_map::ChannelMapping;
pub use error::DataError;
pub use schema::{FACT_COLUMNS, LINE_ITEM_COLUMNS, SchemaDrift};
