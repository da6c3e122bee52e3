//! Anomaly Scorer
//!
//! Unsupervised outlier scoring of bearing feature vectors. A model is fit
//! on early, presumed-healthy windows, gated on validation accuracy, and then
//! labels later windows healthy (0) or faulty (1).

mod forest;
mod model;
mod scorer;

pub use forest::{average_path_length, ForestConfig, IsolationForest};
pub use model::{Label, ScoredModel, MODEL_FORMAT_VERSION};
pub use scorer::{AnomalyScorer, ScorerConfig, TrainingOutcome, DEFAULT_MIN_ACCURACY};

use thiserror::Error;

/// Errors during model fitting and scoring
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("Model accuracy {accuracy:.3} is below the accepted minimum {threshold:.3}")]
    ModelBelowThreshold { accuracy: f64, threshold: f64 },
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}
