//! Feature Vector Schema
//!
//! The feature record is a fixed 14-field struct. Its field order is the
//! column order used by feature tables and by the anomaly model.

use crate::statistics::{SpectrumFeatures, TimeFeatures};
use crate::FeatureError;
use serde::{Deserialize, Serialize};

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 14;

/// Feature names in column order: spectral features, then time features
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "frms",
    "fmax_amp",
    "fcrest_Factor",
    "fenergy",
    "fform_factor_absmean",
    "fskewness_val",
    "fkurtosis_val",
    "trms",
    "tmax_amp",
    "tcrest_Factor",
    "tzero_crossing",
    "tform_factor_absmean",
    "tkurtosis_val",
    "tskewness_val",
];

/// Feature vector for one capture window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub frms: f64,
    pub fmax_amp: f64,
    #[serde(rename = "fcrest_Factor")]
    pub fcrest_factor: f64,
    pub fenergy: f64,
    pub fform_factor_absmean: f64,
    pub fskewness_val: f64,
    pub fkurtosis_val: f64,
    pub trms: f64,
    pub tmax_amp: f64,
    #[serde(rename = "tcrest_Factor")]
    pub tcrest_factor: f64,
    pub tzero_crossing: f64,
    pub tform_factor_absmean: f64,
    pub tkurtosis_val: f64,
    pub tskewness_val: f64,
}

impl FeatureVector {
    /// Merge the spectral and time feature families
    pub fn from_parts(spectrum: SpectrumFeatures, time: TimeFeatures) -> Self {
        Self {
            frms: spectrum.rms,
            fmax_amp: spectrum.max_amp,
            fcrest_factor: spectrum.crest_factor,
            fenergy: spectrum.energy,
            fform_factor_absmean: spectrum.form_factor_absmean,
            fskewness_val: spectrum.skewness,
            fkurtosis_val: spectrum.kurtosis,
            trms: time.rms,
            tmax_amp: time.max_amp,
            tcrest_factor: time.crest_factor,
            tzero_crossing: time.zero_crossing,
            tform_factor_absmean: time.form_factor_absmean,
            tkurtosis_val: time.kurtosis,
            tskewness_val: time.skewness,
        }
    }

    /// Values in `FEATURE_NAMES` order
    pub fn values(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.frms,
            self.fmax_amp,
            self.fcrest_factor,
            self.fenergy,
            self.fform_factor_absmean,
            self.fskewness_val,
            self.fkurtosis_val,
            self.trms,
            self.tmax_amp,
            self.tcrest_factor,
            self.tzero_crossing,
            self.tform_factor_absmean,
            self.tkurtosis_val,
            self.tskewness_val,
        ]
    }

    /// Rebuild a vector from values in `FEATURE_NAMES` order
    pub fn from_values(values: &[f64]) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_DIMENSION {
            return Err(FeatureError::SchemaMismatch {
                expected: FEATURE_DIMENSION,
                actual: values.len(),
            });
        }
        Ok(Self {
            frms: values[0],
            fmax_amp: values[1],
            fcrest_factor: values[2],
            fenergy: values[3],
            fform_factor_absmean: values[4],
            fskewness_val: values[5],
            fkurtosis_val: values[6],
            trms: values[7],
            tmax_amp: values[8],
            tcrest_factor: values[9],
            tzero_crossing: values[10],
            tform_factor_absmean: values[11],
            tkurtosis_val: values[12],
            tskewness_val: values[13],
        })
    }

    /// Named values in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.values())
    }

    /// Look up a feature by its table name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}
