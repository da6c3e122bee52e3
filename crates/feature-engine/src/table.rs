//! Feature tables and chronological partitions

use crate::features::{FeatureVector, FEATURE_DIMENSION};
use crate::FeatureError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default share of the training prefix held out for validation
pub const DEFAULT_VAL_FRACTION: f64 = 0.1;

/// One featurized capture window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: NaiveDateTime,
    pub features: FeatureVector,
}

/// Feature rows in capture order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, features: FeatureVector) {
        self.rows.push(FeatureRow {
            timestamp,
            features,
        });
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature vectors without timestamps
    pub fn features(&self) -> Vec<FeatureVector> {
        self.rows.iter().map(|r| r.features).collect()
    }

    /// Feature matrix in column order, timestamps dropped
    pub fn matrix(&self) -> Vec<[f64; FEATURE_DIMENSION]> {
        self.rows.iter().map(|r| r.features.values()).collect()
    }

    /// Whether timestamps never decrease
    pub fn is_chronological(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }

    fn slice(&self, start: usize, end: usize) -> FeatureTable {
        FeatureTable::from_rows(self.rows[start..end].to_vec())
    }
}

/// Chronological train / validation / test split
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub train: FeatureTable,
    pub validation: FeatureTable,
    pub test: FeatureTable,
}

impl Partition {
    pub fn total_len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }
}

/// Split a table into train, validation and test partitions.
///
/// The first `train_size` rows form the training prefix. Its last
/// `floor(val_fraction * train_size)` rows become validation, and every row
/// after the prefix is test.
pub fn split_partition(
    table: &FeatureTable,
    train_size: usize,
    val_fraction: f64,
) -> Result<Partition, FeatureError> {
    if !(0.0..=1.0).contains(&val_fraction) {
        return Err(FeatureError::InvalidConfig(format!(
            "val_fraction must be within [0, 1], got {}",
            val_fraction
        )));
    }
    if train_size > table.len() {
        return Err(FeatureError::InsufficientData {
            requested: train_size,
            available: table.len(),
        });
    }

    let val_size = (val_fraction * train_size as f64).floor() as usize;
    let train_end = train_size - val_size;

    Ok(Partition {
        train: table.slice(0, train_end),
        validation: table.slice(train_end, train_size),
        test: table.slice(train_size, table.len()),
    })
}
