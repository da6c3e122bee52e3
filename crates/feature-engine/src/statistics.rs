//! Statistical Features Computation
//!
//! Scalar descriptors of a value distribution, computed either over the
//! centered time signal or over the spectral amplitudes.

use crate::FeatureError;
use serde::{Deserialize, Serialize};

/// Moment and energy statistics for a slice of values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStatistics {
    /// Root mean square
    pub rms: f64,
    /// Largest value (signed, not absolute)
    pub peak: f64,
    /// Peak over RMS
    pub crest_factor: f64,
    /// Sum of squares
    pub energy: f64,
    /// RMS over mean absolute value
    pub form_factor: f64,
    /// Population skewness
    pub skewness: f64,
    /// Fisher (excess) kurtosis, population estimate
    pub kurtosis: f64,
}

impl SignalStatistics {
    /// Compute statistics, failing instead of producing NaN or infinity
    pub fn compute(values: &[f64]) -> Result<Self, FeatureError> {
        if values.is_empty() {
            return Err(FeatureError::degenerate("empty signal"));
        }

        let n = values.len() as f64;

        let energy: f64 = values.iter().map(|v| v * v).sum();
        let rms = (energy / n).sqrt();
        if rms == 0.0 {
            return Err(FeatureError::degenerate(
                "RMS is zero; crest and form factor undefined",
            ));
        }

        let peak = values.iter().cloned().fold(f64::MIN, f64::max);
        let mean_abs = values.iter().map(|v| v.abs()).sum::<f64>() / n;

        let mean = values.iter().sum::<f64>() / n;
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        for &v in values {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;

        if m2 == 0.0 {
            return Err(FeatureError::degenerate(
                "zero variance; skewness and kurtosis undefined",
            ));
        }

        Ok(Self {
            rms,
            peak,
            crest_factor: peak / rms,
            energy,
            form_factor: rms / mean_abs,
            skewness: m3 / m2.powf(1.5),
            kurtosis: m4 / (m2 * m2) - 3.0,
        })
    }
}

/// Sign with an explicit zero class
fn sign(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Count sign changes between consecutive samples.
///
/// Only steps of at least `threshold` are considered. Each step contributes
/// `|sign(a) - sign(b)|` and the total is halved, so a +1/-1 pair counts once
/// and a pass through an exact zero sample also counts once.
pub fn zero_crossings(values: &[f64], threshold: f64) -> usize {
    let total: i32 = values
        .windows(2)
        .filter(|pair| (pair[0] - pair[1]).abs() >= threshold)
        .map(|pair| (sign(pair[0]) - sign(pair[1])).abs())
        .sum();
    (total / 2) as usize
}

/// Spectral-domain feature family (`f*` keys)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumFeatures {
    pub rms: f64,
    pub max_amp: f64,
    pub crest_factor: f64,
    pub energy: f64,
    pub form_factor_absmean: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

/// Time-domain feature family (`t*` keys)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeFeatures {
    pub rms: f64,
    pub max_amp: f64,
    pub crest_factor: f64,
    pub zero_crossing: f64,
    pub form_factor_absmean: f64,
    pub kurtosis: f64,
    pub skewness: f64,
}

/// Statistics over an amplitude spectrum
pub fn spectrum_features(amplitudes: &[f64]) -> Result<SpectrumFeatures, FeatureError> {
    let stats = SignalStatistics::compute(amplitudes)?;
    Ok(SpectrumFeatures {
        rms: stats.rms,
        max_amp: stats.peak,
        crest_factor: stats.crest_factor,
        energy: stats.energy,
        form_factor_absmean: stats.form_factor,
        skewness: stats.skewness,
        kurtosis: stats.kurtosis,
    })
}

/// Statistics over a centered time signal
pub fn time_features(
    centered: &[f64],
    zero_crossing_threshold: f64,
) -> Result<TimeFeatures, FeatureError> {
    let stats = SignalStatistics::compute(centered)?;
    Ok(TimeFeatures {
        rms: stats.rms,
        max_amp: stats.peak,
        crest_factor: stats.crest_factor,
        zero_crossing: zero_crossings(centered, zero_crossing_threshold) as f64,
        form_factor_absmean: stats.form_factor,
        kurtosis: stats.kurtosis,
        skewness: stats.skewness,
    })
}
