//! Shared application state

use anomaly_scorer::ScoredModel;
use feature_engine::FeatureAssembler;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use storage::{ModelStore, Repository, StorageError};
use tracing::info;

use crate::{ApiError, ServiceConfig};

/// State shared across handlers. Models are loaded on first use and never
/// mutated afterwards.
pub struct AppState {
    pub repository: Repository,
    pub assembler: FeatureAssembler,
    pub model_store: ModelStore,
    models: RwLock<HashMap<usize, Arc<ScoredModel>>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        Ok(Self {
            repository: Repository::with_capacity(config.max_records),
            assembler: FeatureAssembler::new(config.features.clone())?,
            model_store: ModelStore::new(&config.model_dir),
            models: RwLock::new(HashMap::new()),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Model for a bearing, reading it from the store on first request.
    ///
    /// A model trained on features computed differently from this service's
    /// assembler is refused and not cached.
    pub fn model(&self, bearing: usize) -> Result<Arc<ScoredModel>, ApiError> {
        if let Some(model) = self
            .models
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .get(&bearing)
        {
            return Ok(Arc::clone(model));
        }

        let bytes = self.model_store.load(bearing).map_err(|e| match e {
            StorageError::NotFound(_) => ApiError::ModelNotFound(bearing),
            other => other.into(),
        })?;
        let model = ScoredModel::from_bytes(&bytes)?;
        model.check_features(self.assembler.config())?;
        let model = Arc::new(model);
        info!("Loaded model for bearing {}", bearing);

        let mut models = self
            .models
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(Arc::clone(models.entry(bearing).or_insert(model)))
    }
}
