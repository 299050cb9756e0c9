//! Unified error type for the file-backed data layer

use std::path::PathBuf;

use thiserror::Error;

use super::schema::SchemaDrift;

/// Errors from reading batch files, reference tables and persisted CSV tables
#[derive(Error, Debug)]
pub enum DataError {
    /// Filesystem error on a specific path
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Batch file is not a JSON array of orders
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// CSV read/write failure
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Persisted table does not match the column contract
    #[error("Incompatible schema in {path}: {drift}")]
    SchemaDrift { path: PathBuf, drift: SchemaDrift },
}

impl DataError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Csv { source, .. } => matches!(
                source.kind(),
                csv::ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::NotFound
            ),
            _ => false,
        }
    }
}
