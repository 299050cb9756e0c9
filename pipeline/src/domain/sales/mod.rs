//! Sales fact pipeline
//!
//! - `ingest` - Stage 1: batch window selection and order dedup
//! - `flatten` - Stage 2: orders to line items (with `geo` and `channel`)
//! - `aggregate` - Stage 3: line items to daily sales facts
//! - `merge` - Stage 4: incremental merge into the persisted fact table
//! - `pipeline` - Pipeline orchestrator
//! - `report` - KPI and channel summaries of the persisted table

pub mod aggregate;
pub mod channel;
pub mod error;
pub mod flatten;
pub mod geo;
pub mod ingest;
pub mod merge;
pub mod pipeline;
pub mod report;

pub use channel::{ChannelAssignment, ChannelMap};
pub use error::PipelineError;
pub use geo::{GeoLocation, GeoResolver};
pub use merge::{FreshReason, MergeOutcome};
pub use pipeline::{PipelineSettings, RunOutcome, RunReport, SalesPipeline};
