//! Training and scoring entry points

use crate::forest::{ForestConfig, IsolationForest};
use crate::model::{Label, ScoredModel};
use crate::ScorerError;
use feature_engine::{FeatureConfig, FeatureVector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Minimum validation accuracy for a model to be kept
pub const DEFAULT_MIN_ACCURACY: f64 = 0.80;

/// Scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Estimator hyperparameters
    pub forest: ForestConfig,
    /// Accuracy floor on the validation partition
    pub min_accuracy: f64,
    /// Configuration the training rows were computed with; stored in the model
    pub features: FeatureConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            min_accuracy: DEFAULT_MIN_ACCURACY,
            features: FeatureConfig::default(),
        }
    }
}

/// Result of an accepted training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: ScoredModel,
    /// Share of validation rows labeled healthy
    pub accuracy: f64,
    pub train_labels: Vec<Label>,
    pub validation_labels: Vec<Label>,
}

/// Fits, evaluates and applies outlier models
#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer {
    config: ScorerConfig,
}

impl AnomalyScorer {
    pub fn new(config: ScorerConfig) -> Result<Self, ScorerError> {
        config.forest.validate()?;
        if !(0.0..=1.0).contains(&config.min_accuracy) {
            return Err(ScorerError::InvalidConfig(format!(
                "min_accuracy must be within [0, 1], got {}",
                config.min_accuracy
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Fit a model on training rows
    pub fn fit(&self, train: &[FeatureVector]) -> Result<ScoredModel, ScorerError> {
        let rows: Vec<Vec<f64>> = train.iter().map(|f| f.values().to_vec()).collect();
        let forest = IsolationForest::fit(self.config.forest.clone(), &rows)?;
        info!(
            "Fitted isolation forest: {} trees on {} rows (offset {:.4})",
            self.config.forest.n_estimators,
            rows.len(),
            forest.offset()
        );
        Ok(ScoredModel::new(forest, self.config.features.clone()))
    }

    /// Label rows healthy or faulty
    pub fn score(
        &self,
        model: &ScoredModel,
        features: &[FeatureVector],
    ) -> Result<Vec<Label>, ScorerError> {
        model.label(features)
    }

    /// Share of rows labeled healthy; validation rows are healthy by construction
    pub fn evaluate(
        &self,
        model: &ScoredModel,
        validation: &[FeatureVector],
    ) -> Result<f64, ScorerError> {
        let labels = model.label(validation)?;
        healthy_share(&labels)
    }

    /// Fit on `train`, then reject the model if validation accuracy is below the floor
    pub fn train(
        &self,
        train: &[FeatureVector],
        validation: &[FeatureVector],
    ) -> Result<TrainingOutcome, ScorerError> {
        let model = self.fit(train)?;
        let train_labels = model.label(train)?;
        let validation_labels = model.label(validation)?;
        let accuracy = healthy_share(&validation_labels)?;

        info!("Model accuracy: {:.3}", accuracy);

        if accuracy < self.config.min_accuracy {
            warn!(
                "Rejecting model: accuracy {:.3} < {:.3}",
                accuracy, self.config.min_accuracy
            );
            return Err(ScorerError::ModelBelowThreshold {
                accuracy,
                threshold: self.config.min_accuracy,
            });
        }

        Ok(TrainingOutcome {
            model,
            accuracy,
            train_labels,
            validation_labels,
        })
    }
}

fn healthy_share(labels: &[Label]) -> Result<f64, ScorerError> {
    if labels.is_empty() {
        return Err(ScorerError::InsufficientData(
            "validation partition is empty".to_string(),
        ));
    }
    let healthy = labels.iter().filter(|l| **l == Label::Healthy).count();
    Ok(healthy as f64 / labels.len() as f64)
}
