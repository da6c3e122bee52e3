//! Scoring Route

use anomaly_scorer::ScorerError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use storage::HealthRecord;
use tracing::{debug, info};

use crate::error::ErrorResponse;
use crate::{ApiError, AppState};

/// One capture window to score
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    /// Single-channel acceleration samples in g
    pub accel_data: Vec<f64>,
    /// Capture time, epoch seconds
    pub time_stamp: i64,
    /// 1-based bearing number
    pub bearing_num: usize,
}

/// Health summary for one window
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "tS")]
    pub timestamp: i64,
    #[serde(rename = "bN")]
    pub bearing: u32,
    #[serde(rename = "rA")]
    pub rms: f64,
    #[serde(rename = "hS")]
    pub health: u8,
}

impl From<HealthRecord> for InvocationResponse {
    fn from(record: HealthRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp,
            bearing: record.bearing,
            rms: record.rms,
            health: record.health,
        }
    }
}

/// Featurize, score and store one window
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InvocationRequest>, JsonRejection>,
) -> Result<Json<InvocationResponse>, ErrorResponse> {
    let started = Instant::now();
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let bearing = u32::try_from(request.bearing_num)
        .ok()
        .filter(|b| *b >= 1)
        .ok_or_else(|| {
            ApiError::BadRequest(format!("invalid bearingNum {}", request.bearing_num))
        })?;
    let id = HealthRecord::key(request.time_stamp, bearing);
    debug!("Scoring {} ({} samples)", id, request.accel_data.len());

    let record = score(&state, &request, bearing).map_err(|e| e.with_id(id.clone()))?;
    state
        .repository
        .upsert(record.clone())
        .map_err(|e| ApiError::from(e).with_id(id))?;

    metrics::counter!("bearing_invocations_total", "health" => record.health.to_string())
        .increment(1);
    metrics::histogram!("bearing_invocation_seconds").record(started.elapsed().as_secs_f64());
    info!("Scored {}: rA={} hS={}", record.id, record.rms, record.health);

    Ok(Json(record.into()))
}

fn score(
    state: &AppState,
    request: &InvocationRequest,
    bearing: u32,
) -> Result<HealthRecord, ApiError> {
    let model = state.model(request.bearing_num)?;
    let features = state.assembler.featurize(&request.accel_data)?;
    let label = model
        .label(std::slice::from_ref(&features))?
        .into_iter()
        .next()
        .ok_or_else(|| ScorerError::InsufficientData("no prediction produced".to_string()))?;

    Ok(HealthRecord::new(
        request.time_stamp,
        bearing,
        round3(features.trms),
        label.as_u8(),
    ))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.123_456), 0.123);
        assert_eq!(round3(3.4649), 3.465);
        assert_eq!(round3(-1.23449), -1.234);
    }

    #[test]
    fn test_request_field_names() {
        let request: InvocationRequest = serde_json::from_str(
            r#"{"accelData": [0.1, -0.2], "timeStamp": 1076581959, "bearingNum": 2}"#,
        )
        .unwrap();
        assert_eq!(request.accel_data, vec![0.1, -0.2]);
        assert_eq!(request.time_stamp, 1_076_581_959);
        assert_eq!(request.bearing_num, 2);
    }
}
