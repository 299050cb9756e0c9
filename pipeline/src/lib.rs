//! Order normalization and incremental sales-fact aggregation.
//!
//! - `core` - CLI, configuration, constants, run notification
//! - `data` - batch files, reference tables, CSV table I/O, row types
//! - `domain` - flattening, aggregation and merge logic
//! - `utils` - small shared helpers

mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
