//! Batch featurize and train stages
//!
//! `featurize` turns a directory of raw captures into the processed table
//! and its chronological partitions, recording the feature configuration
//! beside them. `train` fits a model on those tables and stamps it with that
//! configuration. The model is persisted only if it clears the accuracy gate;
//! per-row labels are written alongside.

use anomaly_scorer::{AnomalyScorer, ScorerConfig};
use anyhow::{Context, Result};
use feature_engine::{split_partition, FeatureAssembler, FeatureConfig, FeatureTable};
use std::path::{Path, PathBuf};
use storage::{FeatureSink, ModelStore, PartitionKind};
use tracing::info;

/// Row counts written by `featurize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturizeSummary {
    pub rows: usize,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

/// Outcome of an accepted `train` run
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub accuracy: f64,
    pub model_path: PathBuf,
    pub predictions_path: PathBuf,
    /// Rows labeled faulty across all partitions
    pub faulty: usize,
}

/// Featurize every capture in `data_dir` and write the tables to `out_dir`
pub fn featurize(
    config: &FeatureConfig,
    data_dir: &Path,
    bearing: usize,
    train_size: usize,
    val_fraction: f64,
    out_dir: &Path,
) -> Result<FeaturizeSummary> {
    let assembler =
        FeatureAssembler::new(config.clone()).context("invalid feature configuration")?;
    let table = assembler
        .featurize_all(data_dir, bearing)
        .with_context(|| format!("featurizing {} for bearing {}", data_dir.display(), bearing))?;
    let partition = split_partition(&table, train_size, val_fraction)
        .context("partitioning feature table")?;

    let sink = FeatureSink::new(out_dir);
    sink.write_table(PartitionKind::Processed, bearing, &table)?;
    sink.write_partition(bearing, &partition)?;
    sink.write_feature_config(bearing, config)?;

    let summary = FeaturizeSummary {
        rows: table.len(),
        train: partition.train.len(),
        validation: partition.validation.len(),
        test: partition.test.len(),
    };
    info!(
        "Bearing {}: {} rows ({} train, {} validation, {} test)",
        bearing, summary.rows, summary.train, summary.validation, summary.test
    );
    Ok(summary)
}

/// Train a model from the partition tables in `data_dir`.
///
/// The feature configuration recorded by `featurize` replaces
/// `config.features`. A model below the accuracy floor is rejected and
/// nothing is written, so any previously saved model stays in place.
pub fn train(
    mut config: ScorerConfig,
    data_dir: &Path,
    model_dir: &Path,
    bearing: usize,
) -> Result<TrainSummary> {
    let sink = FeatureSink::new(data_dir);
    config.features = sink
        .read_feature_config(bearing)
        .context("reading the feature configuration written by featurize")?;
    let train = sink.read_table(PartitionKind::Train, bearing)?;
    let validation = sink.read_table(PartitionKind::Validation, bearing)?;
    let test = sink.read_table(PartitionKind::Test, bearing)?;

    let scorer = AnomalyScorer::new(config).context("invalid scorer configuration")?;
    let outcome = scorer
        .train(&train.features(), &validation.features())
        .with_context(|| format!("training bearing {}", bearing))?;

    let bytes = outcome.model.to_bytes()?;
    let model_path = ModelStore::new(model_dir).save(bearing, &bytes)?;

    let test_labels = scorer.score(&outcome.model, &test.features())?;
    let scores: Vec<u8> = outcome
        .train_labels
        .iter()
        .chain(&outcome.validation_labels)
        .chain(&test_labels)
        .map(|l| l.as_u8())
        .collect();

    let all = FeatureTable::from_rows(
        train
            .rows()
            .iter()
            .chain(validation.rows())
            .chain(test.rows())
            .copied()
            .collect(),
    );
    let predictions_path = sink.write_predictions(bearing, &all, &scores)?;

    let faulty = scores.iter().filter(|s| **s == 1).count();
    info!(
        "Bearing {}: accuracy {:.3}, {} of {} rows faulty",
        bearing,
        outcome.accuracy,
        faulty,
        scores.len()
    );

    Ok(TrainSummary {
        accuracy: outcome.accuracy,
        model_path,
        predictions_path,
        faulty,
    })
}
