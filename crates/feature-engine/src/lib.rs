//! Feature Engineering Engine
//!
//! Turns raw bearing accelerometer windows into a fixed 14-value feature
//! vector: a band-limited amplitude spectrum plus moment statistics over
//! both the spectrum and the centered time signal.

mod assembler;
mod config;
mod error;
mod features;
mod fft;
mod statistics;
mod table;
mod window;

pub use assembler::FeatureAssembler;
pub use config::{
    AmplitudeScale, FeatureConfig, FrequencyUnit, SpectrumConfig, WindowKind,
    DEFAULT_SAMPLING_RATE, DEFAULT_ZERO_CROSSING_THRESHOLD, MAX_BINS_PER_SAMPLE,
};
pub use error::FeatureError;
pub use features::{FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};
pub use fft::{SpectralResult, SpectralTransform, STANDARD_GRAVITY};
pub use statistics::{
    spectrum_features, time_features, zero_crossings, SignalStatistics, SpectrumFeatures,
    TimeFeatures,
};
pub use table::{split_partition, FeatureRow, FeatureTable, Partition, DEFAULT_VAL_FRACTION};
pub use window::{apply_window, generate_window};
