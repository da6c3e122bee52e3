//! Repository Implementation

use crate::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};

/// One scored request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// `"{timestamp}b{bearing}"`
    #[serde(rename = "_id")]
    pub id: String,
    /// Capture time, epoch seconds
    #[serde(rename = "tS")]
    pub timestamp: i64,
    /// Bearing number
    #[serde(rename = "bN")]
    pub bearing: u32,
    /// Time-domain RMS acceleration, 3 decimals
    #[serde(rename = "rA")]
    pub rms: f64,
    /// 0 healthy, 1 faulty
    #[serde(rename = "hS")]
    pub health: u8,
}

impl HealthRecord {
    pub fn new(timestamp: i64, bearing: u32, rms: f64, health: u8) -> Self {
        Self {
            id: Self::key(timestamp, bearing),
            timestamp,
            bearing,
            rms,
            health,
        }
    }

    /// Record key for a capture time and bearing
    pub fn key(timestamp: i64, bearing: u32) -> String {
        format!("{}b{}", timestamp, bearing)
    }
}

/// Filters for record queries
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub bearing: Option<u32>,
    /// Inclusive lower bound, epoch seconds
    pub since: Option<i64>,
    /// Exclusive upper bound, epoch seconds
    pub until: Option<i64>,
    pub limit: usize,
}

/// In-memory record store with bounded retention
pub struct Repository {
    records: Mutex<VecDeque<HealthRecord>>,
    max_records: usize,
}

impl Repository {
    pub fn new() -> Self {
        Self::with_capacity(100_000)
    }

    pub fn with_capacity(max_records: usize) -> Self {
        info!("Creating in-memory repository (max {} records)", max_records);
        Self {
            records: Mutex::new(VecDeque::with_capacity(max_records.min(10_000))),
            max_records: max_records.max(1),
        }
    }

    /// Insert a record, replacing any record with the same key
    pub fn upsert(&self, record: HealthRecord) -> Result<(), StorageError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
            debug!("Replacing record {}", record.id);
            *existing = record;
            return Ok(());
        }

        while records.len() >= self.max_records {
            records.pop_front();
        }
        debug!("Inserted record {}", record.id);
        records.push_back(record);
        Ok(())
    }

    /// Look up a record by key
    pub fn get(&self, id: &str) -> Result<HealthRecord, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Matching records, newest capture first
    pub fn query(&self, query: &RecordQuery) -> Result<Vec<HealthRecord>, StorageError> {
        let records = self
            .records
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let mut matched: Vec<HealthRecord> = records
            .iter()
            .filter(|r| query.bearing.map_or(true, |b| r.bearing == b))
            .filter(|r| query.since.map_or(true, |s| r.timestamp >= s))
            .filter(|r| query.until.map_or(true, |u| r.timestamp < u))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(query.limit);
        Ok(matched)
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
