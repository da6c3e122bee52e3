//! Feature Extraction Error Types

use capture_reader::CaptureError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during feature extraction
#[derive(Debug, Error)]
pub enum FeatureError {
    /// RMS, mean-abs or variance is zero, or a log amplitude would be undefined
    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    /// Fewer rows than a requested split size
    #[error("Insufficient data: requested {requested} rows, only {available} available")]
    InsufficientData { requested: usize, available: usize },

    /// Configuration value outside its valid domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Feature record with the wrong number of values
    #[error("Feature record has {actual} values, expected {expected}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// Failure reading a capture file
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// A single capture failed, aborting its batch
    #[error("Failed to featurize {file}: {source}")]
    Batch {
        file: PathBuf,
        #[source]
        source: Box<FeatureError>,
    },
}

impl FeatureError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        FeatureError::DegenerateSignal(reason.into())
    }
}
