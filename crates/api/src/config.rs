//! Service configuration
//!
//! Layered from serde defaults, an optional TOML file, and `BEARING__*`
//! environment variables (double underscore separates nested keys, e.g.
//! `BEARING__FEATURES__SAMPLING_RATE=25600`).

use config::{Config, Environment, File, FileFormat};
use feature_engine::FeatureConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ApiError;

/// Settings for the scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Directory holding `model_b{n}.bin` files
    pub model_dir: PathBuf,
    /// Feature extraction settings; must match those used in training
    pub features: FeatureConfig,
    /// Records kept in memory before the oldest are dropped
    pub max_records: usize,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            model_dir: PathBuf::from("models"),
            features: FeatureConfig::default(),
            max_records: 100_000,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration, reading `path` if given
    pub fn load(path: Option<&Path>) -> Result<Self, ApiError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
        }

        builder
            .add_source(
                Environment::with_prefix("BEARING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<ServiceConfig>())
            .map_err(config_error)
    }
}

fn config_error(e: config::ConfigError) -> ApiError {
    ApiError::Config(e.to_string())
}
