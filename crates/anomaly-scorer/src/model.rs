//! Scored model and health labels

use crate::forest::IsolationForest;
use crate::ScorerError;
use feature_engine::{FeatureConfig, FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};
use serde::{Deserialize, Serialize};

/// Bumped whenever the serialized model layout changes
pub const MODEL_FORMAT_VERSION: u16 = 2;

/// Health label of one capture window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Inlier
    Healthy,
    /// Outlier
    Faulty,
}

impl Label {
    /// Map an estimator's native output (negative = outlier)
    pub fn from_native(value: i8) -> Self {
        if value < 0 {
            Label::Faulty
        } else {
            Label::Healthy
        }
    }

    /// `0` for healthy, `1` for faulty
    pub fn as_u8(&self) -> u8 {
        match self {
            Label::Healthy => 0,
            Label::Faulty => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Healthy => "healthy",
            Label::Faulty => "faulty",
        }
    }
}

/// Outlier model fit on one bearing's training windows.
///
/// Carries the feature configuration its training rows were computed with;
/// rows scored against it must come from the same configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredModel {
    forest: IsolationForest,
    feature_names: Vec<String>,
    feature_config: FeatureConfig,
}

#[derive(Serialize, Deserialize)]
struct ModelEnvelope {
    version: u16,
    model: ScoredModel,
}

impl ScoredModel {
    pub(crate) fn new(forest: IsolationForest, feature_config: FeatureConfig) -> Self {
        Self {
            forest,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            feature_config,
        }
    }

    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }

    /// Column names the model was fit on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature configuration the training rows were computed with
    pub fn feature_config(&self) -> &FeatureConfig {
        &self.feature_config
    }

    /// Fail unless rows computed with `config` are comparable to the training rows
    pub fn check_features(&self, config: &FeatureConfig) -> Result<(), ScorerError> {
        if *config != self.feature_config {
            return Err(ScorerError::FeatureMismatch(format!(
                "model trained with {:?}, rows computed with {:?}",
                self.feature_config, config
            )));
        }
        Ok(())
    }

    fn check_schema(&self) -> Result<(), ScorerError> {
        if self.forest.dimension() != FEATURE_DIMENSION {
            return Err(ScorerError::InvalidInputShape {
                expected: FEATURE_DIMENSION,
                actual: self.forest.dimension(),
            });
        }
        if !self.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(ScorerError::FeatureMismatch(format!(
                "model columns {:?} differ from {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        Ok(())
    }

    /// Native estimator output for each row
    pub fn predict_native(&self, features: &[FeatureVector]) -> Result<Vec<i8>, ScorerError> {
        self.check_schema()?;
        features
            .iter()
            .map(|f| self.forest.predict(&f.values()))
            .collect()
    }

    /// Health label for each row
    pub fn label(&self, features: &[FeatureVector]) -> Result<Vec<Label>, ScorerError> {
        Ok(self
            .predict_native(features)?
            .into_iter()
            .map(Label::from_native)
            .collect())
    }

    /// Versioned binary encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, ScorerError> {
        let envelope = ModelEnvelope {
            version: MODEL_FORMAT_VERSION,
            model: self.clone(),
        };
        postcard::to_allocvec(&envelope).map_err(|e| ScorerError::Serialization(e.to_string()))
    }

    /// Decode a model written by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScorerError> {
        let envelope: ModelEnvelope =
            postcard::from_bytes(bytes).map_err(|e| ScorerError::Serialization(e.to_string()))?;
        if envelope.version != MODEL_FORMAT_VERSION {
            return Err(ScorerError::Serialization(format!(
                "unsupported model format version {} (expected {})",
                envelope.version, MODEL_FORMAT_VERSION
            )));
        }
        envelope.model.check_schema()?;
        Ok(envelope.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestConfig;
    use feature_engine::WindowKind;

    #[test]
    fn test_label_mapping() {
        assert_eq!(Label::from_native(-1), Label::Faulty);
        assert_eq!(Label::from_native(1), Label::Healthy);
        assert_eq!(Label::Faulty.as_u8(), 1);
        assert_eq!(Label::Healthy.as_u8(), 0);
    }

    fn forest(dimension: usize) -> IsolationForest {
        let rows: Vec<Vec<f64>> = (0..32)
            .map(|r| (0..dimension).map(|k| ((r * 7 + k * 13) % 17) as f64).collect())
            .collect();
        IsolationForest::fit(ForestConfig::default(), &rows).unwrap()
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let mut model = ScoredModel::new(forest(FEATURE_DIMENSION), FeatureConfig::default());
        model.feature_names.swap(0, 1);
        let err = ScoredModel::from_bytes(&model.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, ScorerError::FeatureMismatch(_)));
    }

    #[test]
    fn test_dimension_mismatch_reports_vocabulary_as_expected() {
        let model = ScoredModel::new(forest(3), FeatureConfig::default());
        match ScoredModel::from_bytes(&model.to_bytes().unwrap()).unwrap_err() {
            ScorerError::InvalidInputShape { expected, actual } => {
                assert_eq!(expected, FEATURE_DIMENSION);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_feature_config_round_trips_and_is_checked() {
        let config = FeatureConfig::with_sampling_rate(25_600);
        let model = ScoredModel::new(forest(FEATURE_DIMENSION), config.clone());
        let restored = ScoredModel::from_bytes(&model.to_bytes().unwrap()).unwrap();

        assert_eq!(restored.feature_config(), &config);
        assert!(restored.check_features(&config).is_ok());

        let mut hann = config;
        hann.spectrum.window = WindowKind::Hann;
        assert!(matches!(
            restored.check_features(&hann),
            Err(ScorerError::FeatureMismatch(_))
        ));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = ScoredModel::from_bytes(&[0xff, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, ScorerError::Serialization(_)));
    }
}
