//! Capture Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading a capture file
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Wrong column count or non-numeric content
    #[error("Malformed capture {file}: {reason}")]
    MalformedCapture { file: PathBuf, reason: String },

    /// File name is not a `YYYY.MM.DD.HH.MM.SS` capture time
    #[error("Invalid capture timestamp '{0}'")]
    InvalidTimestamp(String),

    /// Bearing index is 1-based
    #[error("Bearing index must be 1-based, got {0}")]
    InvalidBearing(usize),

    /// Underlying I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    pub(crate) fn malformed(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CaptureError::MalformedCapture {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CaptureError::Io {
            path: path.into(),
            source,
        }
    }
}
