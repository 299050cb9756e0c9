//! Domain logic for order normalization
//!
//! - `sales` - line-item flattening, fact aggregation and incremental merge

pub mod sales;

pub use sales::{PipelineError, SalesPipeline};
