//! FFT-based Spectral Transform
//!
//! One-sided, band-limited amplitude spectrum of a fixed-rate accelerometer
//! window. Every call plans its own FFT, so a transform can be shared across
//! threads without coordination.

use crate::config::{AmplitudeScale, FrequencyUnit, SpectrumConfig, MAX_BINS_PER_SAMPLE};
use crate::window::apply_window;
use crate::FeatureError;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

/// Conversion from g to m/s²
pub const STANDARD_GRAVITY: f64 = 9.8;

/// Output of a spectral transform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralResult {
    /// Gravity-scaled, de-meaned and windowed signal (whole seconds only)
    pub centered_signal: Vec<f64>,
    /// One-sided amplitudes, ascending frequency, band-limited
    pub amplitudes: Vec<f64>,
    /// Bin frequencies matching `amplitudes`
    pub frequencies: Vec<f64>,
}

impl SpectralResult {
    /// Number of retained bins
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Frequency of the largest amplitude bin
    pub fn peak_frequency(&self) -> Option<f64> {
        self.amplitudes
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &a)| match best {
                Some((_, b)) if b >= a => best,
                _ => Some((i, a)),
            })
            .map(|(i, _)| self.frequencies[i])
    }
}

/// Spectral transform with fixed options
#[derive(Debug, Clone, Default)]
pub struct SpectralTransform {
    config: SpectrumConfig,
}

impl SpectralTransform {
    /// Create a transform, rejecting out-of-domain options
    pub fn new(config: SpectrumConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Compute the amplitude spectrum of `signal` (in g) sampled at `sampling_rate` Hz.
    ///
    /// Only whole seconds of input are used. Input shorter than one second
    /// produces an empty result rather than an error.
    pub fn transform(
        &self,
        signal: &[f64],
        sampling_rate: u32,
    ) -> Result<SpectralResult, FeatureError> {
        if sampling_rate == 0 {
            return Err(FeatureError::InvalidConfig(
                "sampling_rate must be positive".to_string(),
            ));
        }

        let rate = sampling_rate as usize;
        let duration = signal.len() / rate;
        let usable = duration * rate;
        let fs = sampling_rate as f64;

        let nyquist = fs / 2.0;
        let f_max = self.config.f_max.map_or(nyquist, |f| f.min(nyquist));

        let num_bins = match self.config.resolution {
            None => usable,
            Some(resolution) => {
                let bins = usable as f64 / resolution;
                let cap = usable.saturating_mul(MAX_BINS_PER_SAMPLE);
                if !bins.is_finite() || bins > cap as f64 {
                    return Err(FeatureError::InvalidConfig(format!(
                        "resolution {} needs {} bins for {} samples (limit {})",
                        resolution, bins, usable, cap
                    )));
                }
                bins as usize
            }
        };

        let scaled: Vec<f64> = signal[..usable]
            .iter()
            .map(|&v| v * STANDARD_GRAVITY)
            .collect();
        let mean = if scaled.is_empty() {
            0.0
        } else {
            scaled.iter().sum::<f64>() / scaled.len() as f64
        };
        let mut centered: Vec<f64> = scaled.iter().map(|&v| v - mean).collect();
        apply_window(&mut centered, self.config.window);

        if num_bins == 0 {
            return Ok(SpectralResult {
                centered_signal: centered,
                amplitudes: Vec::new(),
                frequencies: Vec::new(),
            });
        }

        // Zero-pad or truncate to the transform size
        let mut buffer: Vec<Complex<f64>> = (0..num_bins)
            .map(|i| Complex::new(centered.get(i).copied().unwrap_or(0.0), 0.0))
            .collect();
        let fft = FftPlanner::new().plan_fft_forward(num_bins);
        fft.process(&mut buffer);

        let half = num_bins / 2;
        let bin_width = fs / num_bins as f64;
        let keep = ((f_max / bin_width) as usize).min(half);

        let scale = 2.0 / num_bins as f64;
        let mut amplitudes: Vec<f64> = buffer
            .iter()
            .take(keep)
            .map(|c| scale * c.norm())
            .collect();

        if self.config.amplitude_scale == AmplitudeScale::Log {
            for (bin, amplitude) in amplitudes.iter_mut().enumerate() {
                if *amplitude <= 0.0 {
                    return Err(FeatureError::degenerate(format!(
                        "log amplitude undefined for zero amplitude at bin {}",
                        bin
                    )));
                }
                *amplitude = 10.0 * amplitude.log10();
            }
        }

        let step = 1.0 / (num_bins as f64 * (1.0 / fs));
        let unit = match self.config.frequency_unit {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::Cpm => 60.0,
        };
        let frequencies: Vec<f64> = (0..keep).map(|k| k as f64 * step * unit).collect();

        Ok(SpectralResult {
            centered_signal: centered,
            amplitudes,
            frequencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowKind;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f64, rate: u32, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / rate as f64).sin())
            .collect()
    }

    #[test]
    fn test_fft_sine_wave() {
        let transform = SpectralTransform::default();
        let signal = sine(500.0, 1.0, 20_480, 20_480);

        let result = transform.transform(&signal, 20_480).unwrap();

        let peak = result.peak_frequency().unwrap();
        assert!((peak - 500.0).abs() <= 1.0);
        let max_amp = result.amplitudes.iter().cloned().fold(f64::MIN, f64::max);
        assert!((max_amp - STANDARD_GRAVITY).abs() < 1e-6);
    }

    #[test]
    fn test_lengths_and_axis() {
        let transform = SpectralTransform::default();
        let result = transform.transform(&sine(10.0, 0.5, 1000, 2000), 1000).unwrap();
        assert_eq!(result.amplitudes.len(), result.frequencies.len());
        // 2 seconds at 1 kHz: 2000 bins, 1000 kept up to Nyquist
        assert_eq!(result.len(), 1000);
        assert_eq!(result.frequencies[0], 0.0);
        assert!((result.frequencies[1] - 0.5).abs() < 1e-12);
        assert_eq!(result.centered_signal.len(), 2000);
    }

    #[test]
    fn test_trailing_partial_second_dropped() {
        let transform = SpectralTransform::default();
        let result = transform.transform(&sine(10.0, 1.0, 100, 250), 100).unwrap();
        assert_eq!(result.centered_signal.len(), 200);
        assert_eq!(result.len(), 100);
    }

    #[test]
    fn test_short_input_is_empty() {
        let transform = SpectralTransform::default();
        let result = transform.transform(&[0.1, 0.2, 0.3], 100).unwrap();
        assert!(result.is_empty());
        assert!(result.frequencies.is_empty());
        assert!(result.centered_signal.is_empty());
    }

    #[test]
    fn test_all_zero_signal() {
        let transform = SpectralTransform::default();
        let result = transform.transform(&vec![0.0; 256], 128).unwrap();
        assert!(result.amplitudes.iter().all(|&a| a == 0.0));
        assert!(result.centered_signal.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_log_of_zero_is_degenerate() {
        let config = SpectrumConfig {
            amplitude_scale: AmplitudeScale::Log,
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let err = transform.transform(&vec![0.0; 256], 128).unwrap_err();
        assert!(matches!(err, FeatureError::DegenerateSignal(_)));
    }

    #[test]
    fn test_log_scale_values() {
        let config = SpectrumConfig {
            amplitude_scale: AmplitudeScale::Log,
            f_max: Some(30.0),
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        // Constant offset plus a tone; DC removed exactly, so start above bin 0
        let signal: Vec<f64> = sine(20.0, 1.0, 128, 128)
            .iter()
            .enumerate()
            .map(|(i, v)| v + 1e-3 * ((i * 7 % 13) as f64))
            .collect();
        let result = transform.transform(&signal, 128).unwrap();
        let expected = 10.0 * STANDARD_GRAVITY.log10();
        assert!((result.amplitudes[20] - expected).abs() < 0.1);
    }

    #[test]
    fn test_f_max_truncation_index() {
        let config = SpectrumConfig {
            f_max: Some(100.0),
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(50.0, 1.0, 1000, 1000), 1000).unwrap();
        // floor(100 / (1000 / 1000)) = 100 bins
        assert_eq!(result.len(), 100);
        assert!(result.frequencies.iter().all(|&f| f < 100.0));
    }

    #[test]
    fn test_f_max_clamped_to_nyquist() {
        let config = SpectrumConfig {
            f_max: Some(1.0e6),
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(50.0, 1.0, 1000, 1000), 1000).unwrap();
        assert_eq!(result.len(), 500);
    }

    #[test]
    fn test_resolution_reduces_bins() {
        let config = SpectrumConfig {
            resolution: Some(2.0),
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(50.0, 1.0, 1000, 1000), 1000).unwrap();
        // 500 bins of 2 Hz, 250 kept up to Nyquist
        assert_eq!(result.len(), 250);
        assert!((result.frequencies[1] - 2.0).abs() < 1e-12);
        let peak = result.peak_frequency().unwrap();
        assert!((peak - 50.0).abs() <= 2.0);
    }

    #[test]
    fn test_cpm_axis() {
        let config = SpectrumConfig {
            frequency_unit: FrequencyUnit::Cpm,
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(10.0, 1.0, 100, 100), 100).unwrap();
        assert!((result.frequencies[1] - 60.0).abs() < 1e-12);
        let peak = result.peak_frequency().unwrap();
        assert!((peak - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_hann_window_applied_to_centered_signal() {
        let config = SpectrumConfig {
            window: WindowKind::Hann,
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(10.0, 1.0, 100, 100), 100).unwrap();
        // Periodic Hann starts at zero
        assert_eq!(result.centered_signal[0], 0.0);
        let peak = result.peak_frequency().unwrap();
        assert!((peak - 10.0).abs() <= 1.0);
    }

    #[test]
    fn test_odd_bin_count() {
        let config = SpectrumConfig {
            resolution: Some(3.0),
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(30.0, 1.0, 100, 100), 100).unwrap();
        // 33 bins, 16 one-sided
        assert_eq!(result.len(), 16);
        assert_eq!(result.amplitudes.len(), result.frequencies.len());
    }

    #[test]
    fn test_unbounded_resolution_rejected() {
        // Bypasses `new` so the guard inside `transform` is what rejects it
        let transform = SpectralTransform {
            config: SpectrumConfig {
                resolution: Some(1e-20),
                ..Default::default()
            },
        };
        let err = transform.transform(&[0.5; 100], 100).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidConfig(_)));

        let config = SpectrumConfig {
            resolution: Some(1e-20),
            ..Default::default()
        };
        assert!(SpectralTransform::new(config).is_err());
    }

    #[test]
    fn test_finest_resolution_accepted() {
        let config = SpectrumConfig {
            resolution: Some(1.0 / MAX_BINS_PER_SAMPLE as f64),
            ..Default::default()
        };
        let transform = SpectralTransform::new(config).unwrap();
        let result = transform.transform(&sine(10.0, 1.0, 100, 100), 100).unwrap();
        // 1600 bins, 800 one-sided
        assert_eq!(result.len(), 800);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let transform = SpectralTransform::default();
        assert!(transform.transform(&[1.0, 2.0], 0).is_err());
    }

    proptest! {
        #[test]
        fn prop_axes_have_equal_length(
            samples in proptest::collection::vec(-5.0f64..5.0, 0..600),
            rate in 1u32..200,
            resolution in proptest::option::of(0.25f64..8.0),
            f_max in proptest::option::of(0.5f64..300.0),
        ) {
            let config = SpectrumConfig { resolution, f_max, ..Default::default() };
            let transform = SpectralTransform::new(config).unwrap();
            let result = transform.transform(&samples, rate).unwrap();
            prop_assert_eq!(result.amplitudes.len(), result.frequencies.len());
            prop_assert!(result.amplitudes.iter().all(|a| a.is_finite()));
        }
    }
}
