//! Feature table CSV files
//!
//! One file per bearing and partition, `{kind}_data_b{n}.csv`, with a
//! `timestamp` column followed by the feature columns in vocabulary order.
//! Floats are written with `Display`, which round-trips exactly. The
//! feature configuration the tables were computed with is kept beside them
//! as `feature_config_b{n}.json`.

use crate::StorageError;
use capture_reader::{format_timestamp, parse_table_timestamp};
use feature_engine::{
    FeatureConfig, FeatureTable, FeatureVector, Partition, FEATURE_DIMENSION, FEATURE_NAMES,
};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Which table a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// Every window of a run
    Processed,
    Train,
    Validation,
    Test,
}

impl PartitionKind {
    fn prefix(&self) -> &'static str {
        match self {
            PartitionKind::Processed => "processed",
            PartitionKind::Train => "train",
            PartitionKind::Validation => "val",
            PartitionKind::Test => "test",
        }
    }
}

/// Reads and writes feature tables under one directory
#[derive(Debug, Clone)]
pub struct FeatureSink {
    dir: PathBuf,
}

impl FeatureSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: PartitionKind, bearing: usize) -> PathBuf {
        self.dir
            .join(format!("{}_data_b{}.csv", kind.prefix(), bearing))
    }

    pub fn predictions_path(&self, bearing: usize) -> PathBuf {
        self.dir.join(format!("predictions_b{}.csv", bearing))
    }

    pub fn feature_config_path(&self, bearing: usize) -> PathBuf {
        self.dir.join(format!("feature_config_b{}.json", bearing))
    }

    /// Record the configuration a bearing's tables were computed with
    pub fn write_feature_config(
        &self,
        bearing: usize,
        config: &FeatureConfig,
    ) -> Result<PathBuf, StorageError> {
        let path = self.feature_config_path(bearing);
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let json = serde_json::to_string_pretty(config).map_err(|e| StorageError::Serialization {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| StorageError::io(&path, e))?;
        Ok(path)
    }

    /// Read the configuration written by `write_feature_config`
    pub fn read_feature_config(&self, bearing: usize) -> Result<FeatureConfig, StorageError> {
        let path = self.feature_config_path(bearing);
        let json = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        serde_json::from_str(&json).map_err(|e| StorageError::Serialization {
            path,
            reason: e.to_string(),
        })
    }

    /// Write a table, replacing any existing file
    pub fn write_table(
        &self,
        kind: PartitionKind,
        bearing: usize,
        table: &FeatureTable,
    ) -> Result<PathBuf, StorageError> {
        let path = self.path_for(kind, bearing);
        write_rows(&path, table, None)?;
        info!("Wrote {} rows to {}", table.len(), path.display());
        Ok(path)
    }

    /// Read a table written by `write_table`
    pub fn read_table(
        &self,
        kind: PartitionKind,
        bearing: usize,
    ) -> Result<FeatureTable, StorageError> {
        let path = self.path_for(kind, bearing);
        let content = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        parse_table(&path, &content)
    }

    /// Write the train, validation and test tables of a partition
    pub fn write_partition(
        &self,
        bearing: usize,
        partition: &Partition,
    ) -> Result<(), StorageError> {
        self.write_table(PartitionKind::Train, bearing, &partition.train)?;
        self.write_table(PartitionKind::Validation, bearing, &partition.validation)?;
        self.write_table(PartitionKind::Test, bearing, &partition.test)?;
        Ok(())
    }

    /// Write a table with a trailing `scores` column of health labels
    pub fn write_predictions(
        &self,
        bearing: usize,
        table: &FeatureTable,
        scores: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let path = self.predictions_path(bearing);
        if scores.len() != table.len() {
            return Err(StorageError::MalformedTable {
                path,
                line: 0,
                reason: format!("{} scores for {} rows", scores.len(), table.len()),
            });
        }
        write_rows(&path, table, Some(scores))?;
        info!("Wrote {} predictions to {}", scores.len(), path.display());
        Ok(path)
    }
}

fn write_rows(
    path: &Path,
    table: &FeatureTable,
    scores: Option<&[u8]>,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    let file = fs::File::create(path).map_err(|e| StorageError::io(path, e))?;
    let mut out = BufWriter::new(file);

    let mut header = String::from("timestamp");
    for name in FEATURE_NAMES {
        header.push(',');
        header.push_str(name);
    }
    if scores.is_some() {
        header.push_str(",scores");
    }

    let mut write = |line: &str| writeln!(out, "{}", line).map_err(|e| StorageError::io(path, e));
    write(&header)?;

    for (i, row) in table.rows().iter().enumerate() {
        let mut line = format_timestamp(&row.timestamp);
        for value in row.features.values() {
            line.push(',');
            line.push_str(&value.to_string());
        }
        if let Some(scores) = scores {
            line.push(',');
            line.push_str(&scores[i].to_string());
        }
        write(&line)?;
    }

    out.flush().map_err(|e| StorageError::io(path, e))
}

fn parse_table(path: &Path, content: &str) -> Result<FeatureTable, StorageError> {
    let malformed = |line: usize, reason: String| StorageError::MalformedTable {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut lines = content.lines().enumerate();
    let header: Vec<&str> = match lines.next() {
        Some((_, h)) => h.split(',').map(str::trim).collect(),
        None => return Err(malformed(1, "missing header".to_string())),
    };
    let expected: Vec<&str> = std::iter::once("timestamp").chain(FEATURE_NAMES).collect();
    if header != expected {
        return Err(malformed(1, format!("unexpected header {:?}", header)));
    }

    let mut table = FeatureTable::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != FEATURE_DIMENSION + 1 {
            return Err(malformed(
                line_no,
                format!("expected {} fields, found {}", FEATURE_DIMENSION + 1, fields.len()),
            ));
        }

        let timestamp =
            parse_table_timestamp(fields[0]).map_err(|e| malformed(line_no, e.to_string()))?;
        let values = fields[1..]
            .iter()
            .map(|f| f.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(line_no, e.to_string()))?;
        let features =
            FeatureVector::from_values(&values).map_err(|e| malformed(line_no, e.to_string()))?;
        table.push(timestamp, features);
    }

    Ok(table)
}
