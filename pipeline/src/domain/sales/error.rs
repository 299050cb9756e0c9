//! Pipeline error types

use std::path::PathBuf;

use thiserror::Error;

use crate::data::DataError;

/// Fatal pipeline conditions
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The raw directory contains no `orders_*.json` files at all
    #[error("No raw order batches found in {}", .0.display())]
    NoBatches(PathBuf),

    #[error(transparent)]
    Data(#[from] DataError),
}
