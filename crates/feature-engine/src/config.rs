//! Feature extraction configuration

use crate::FeatureError;
use serde::{Deserialize, Serialize};

/// Sampling rate of the reference test rig (Hz)
pub const DEFAULT_SAMPLING_RATE: u32 = 20_480;

/// Minimum step between consecutive samples for a zero crossing to count
pub const DEFAULT_ZERO_CROSSING_THRESHOLD: f64 = 0.015;

/// Upper bound on transform bins per input sample; caps how fine `resolution` may be
pub const MAX_BINS_PER_SAMPLE: usize = 16;

/// Taper applied before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// No taper
    #[default]
    Rectangular,
    /// Periodic Hann
    Hann,
    /// Periodic Hamming
    Hamming,
}

/// Unit of the frequency axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    #[default]
    Hz,
    /// Cycles per minute
    Cpm,
}

/// Scale of the amplitude axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmplitudeScale {
    #[default]
    Linear,
    /// `10 * log10(amplitude)`
    Log,
}

/// Spectral transform options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Frequency resolution divisor; `None` uses one bin per sample
    pub resolution: Option<f64>,
    /// Window applied to the centered signal
    pub window: WindowKind,
    /// Frequency axis unit
    pub frequency_unit: FrequencyUnit,
    /// Amplitude axis scale
    pub amplitude_scale: AmplitudeScale,
    /// Band limit in Hz; `None` or anything above Nyquist means Nyquist
    pub f_max: Option<f64>,
}

impl SpectrumConfig {
    /// Check option domains
    pub fn validate(&self) -> Result<(), FeatureError> {
        if let Some(resolution) = self.resolution {
            let min = 1.0 / MAX_BINS_PER_SAMPLE as f64;
            if !(resolution.is_finite() && resolution >= min) {
                return Err(FeatureError::InvalidConfig(format!(
                    "resolution must be at least {}, got {}",
                    min, resolution
                )));
            }
        }
        if let Some(f_max) = self.f_max {
            if !(f_max.is_finite() && f_max > 0.0) {
                return Err(FeatureError::InvalidConfig(format!(
                    "f_max must be positive, got {}",
                    f_max
                )));
            }
        }
        Ok(())
    }
}

/// Full feature extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Sampling rate (Hz)
    pub sampling_rate: u32,
    /// Spectral transform options
    pub spectrum: SpectrumConfig,
    /// Zero-crossing noise threshold
    pub zero_crossing_threshold: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sampling_rate: DEFAULT_SAMPLING_RATE,
            spectrum: SpectrumConfig::default(),
            zero_crossing_threshold: DEFAULT_ZERO_CROSSING_THRESHOLD,
        }
    }
}

impl FeatureConfig {
    /// Default configuration at a given sampling rate
    pub fn with_sampling_rate(sampling_rate: u32) -> Self {
        Self {
            sampling_rate,
            ..Default::default()
        }
    }

    /// Check option domains
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.sampling_rate == 0 {
            return Err(FeatureError::InvalidConfig(
                "sampling_rate must be positive".to_string(),
            ));
        }
        if !(self.zero_crossing_threshold.is_finite() && self.zero_crossing_threshold >= 0.0) {
            return Err(FeatureError::InvalidConfig(format!(
                "zero_crossing_threshold must be non-negative, got {}",
                self.zero_crossing_threshold
            )));
        }
        self.spectrum.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeatureConfig::default();
        assert_eq!(config.sampling_rate, 20_480);
        assert_eq!(config.spectrum.window, WindowKind::Rectangular);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(FeatureConfig::with_sampling_rate(0).validate().is_err());

        let mut config = FeatureConfig::default();
        config.spectrum.resolution = Some(0.0);
        assert!(config.validate().is_err());

        let mut config = FeatureConfig::default();
        config.spectrum.f_max = Some(-10.0);
        assert!(config.validate().is_err());

        let mut config = FeatureConfig::default();
        config.spectrum.resolution = Some(1e-20);
        assert!(config.validate().is_err());

        let mut config = FeatureConfig::default();
        config.spectrum.resolution = Some(1.0 / MAX_BINS_PER_SAMPLE as f64);
        assert!(config.validate().is_ok());

        let mut config = FeatureConfig::default();
        config.zero_crossing_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }
}
