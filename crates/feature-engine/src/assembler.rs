//! Feature Assembly
//!
//! Runs the spectral transform and both statistics passes over a capture
//! window, and over a whole directory of captures.

use crate::config::FeatureConfig;
use crate::features::FeatureVector;
use crate::fft::SpectralTransform;
use crate::statistics::{spectrum_features, time_features};
use crate::table::FeatureTable;
use crate::FeatureError;
use capture_reader::{list_captures, read_window, RawWindow};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Builds feature vectors from raw accelerometer windows.
///
/// Holds only immutable configuration; the same assembler serves training
/// and inference so both compute identical features.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    config: FeatureConfig,
    transform: SpectralTransform,
}

impl FeatureAssembler {
    /// Create an assembler, rejecting out-of-domain configuration
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        let transform = SpectralTransform::new(config.spectrum.clone())?;
        Ok(Self { config, transform })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn sampling_rate(&self) -> u32 {
        self.config.sampling_rate
    }

    /// Featurize one channel of samples (in g)
    pub fn featurize(&self, samples: &[f64]) -> Result<FeatureVector, FeatureError> {
        let spectrum = self.transform.transform(samples, self.config.sampling_rate)?;
        if spectrum.is_empty() {
            return Err(FeatureError::DegenerateSignal(self.empty_spectrum_reason(samples.len())));
        }

        let spectral = spectrum_features(&spectrum.amplitudes)?;
        let time = time_features(
            &spectrum.centered_signal,
            self.config.zero_crossing_threshold,
        )?;
        Ok(FeatureVector::from_parts(spectral, time))
    }

    fn empty_spectrum_reason(&self, len: usize) -> String {
        let rate = self.config.sampling_rate;
        if len < rate as usize {
            return format!("{} samples is shorter than one second at {} Hz", len, rate);
        }
        let usable = (len - len % rate as usize) as f64;
        let spectrum = &self.config.spectrum;
        match (spectrum.resolution, spectrum.f_max) {
            (Some(resolution), _) if usable / resolution < 2.0 => {
                format!("resolution {} leaves fewer than two transform bins", resolution)
            }
            (_, Some(f_max)) => format!("f_max {} Hz is below one frequency bin", f_max),
            _ => "no spectral bins retained".to_string(),
        }
    }

    /// Featurize a capture window
    pub fn featurize_window(&self, window: &RawWindow) -> Result<FeatureVector, FeatureError> {
        self.featurize(window.samples())
    }

    /// Featurize every capture in a directory for one bearing.
    ///
    /// Rows follow file-name order, which is capture order. Any failing file
    /// aborts the batch; a partial table is never returned.
    pub fn featurize_all(&self, dir: &Path, bearing: usize) -> Result<FeatureTable, FeatureError> {
        let files = list_captures(dir)?;
        info!(
            "Featurizing {} captures from {} (bearing {})",
            files.len(),
            dir.display(),
            bearing
        );

        let mut table = FeatureTable::new();
        for path in &files {
            let window = read_window(path, bearing).map_err(|e| batch_error(path, e.into()))?;
            let features = self
                .featurize_window(&window)
                .map_err(|e| batch_error(path, e))?;
            debug!("Featurized {} (trms={:.4})", path.display(), features.trms);
            table.push(window.timestamp(), features);
        }

        Ok(table)
    }
}

fn batch_error(path: &Path, source: FeatureError) -> FeatureError {
    FeatureError::Batch {
        file: PathBuf::from(path),
        source: Box::new(source),
    }
}
