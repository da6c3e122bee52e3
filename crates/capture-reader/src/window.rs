//! Raw capture window

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One sensor channel over one capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWindow {
    /// Capture time parsed from the file name
    timestamp: NaiveDateTime,
    /// 1-based bearing/channel index
    bearing: usize,
    /// Samples in g
    samples: Vec<f64>,
}

impl RawWindow {
    /// Create a window from already-read samples
    pub fn new(timestamp: NaiveDateTime, bearing: usize, samples: Vec<f64>) -> Self {
        Self {
            timestamp,
            bearing,
            samples,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn bearing(&self) -> usize {
        self.bearing
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
