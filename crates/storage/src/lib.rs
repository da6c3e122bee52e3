//! Storage Layer
//!
//! Feature tables as CSV, trained models as files keyed by bearing, and an
//! in-memory repository of scored health records.

mod feature_sink;
mod model_store;
mod repository;

pub use feature_sink::{FeatureSink, PartitionKind};
pub use model_store::ModelStore;
pub use repository::{HealthRecord, RecordQuery, Repository};

use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed table {path} at line {line}: {reason}")]
    MalformedTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Malformed file {path}: {reason}")]
    Serialization { path: PathBuf, reason: String },
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
