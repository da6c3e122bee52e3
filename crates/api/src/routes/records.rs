//! Record Routes

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{HealthRecord, RecordQuery};

use crate::{ApiError, AppState};

const MAX_LIMIT: usize = 1000;

/// Query parameters for the records endpoint
#[derive(Debug, Deserialize)]
pub struct RecordParams {
    /// Filter by bearing number
    pub bearing: Option<u32>,
    /// Earliest capture time, epoch seconds (inclusive)
    pub since: Option<i64>,
    /// Latest capture time, epoch seconds (exclusive)
    pub until: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub data: Vec<HealthRecord>,
    pub count: usize,
}

/// Stored health records, newest first
pub async fn get_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecordParams>,
) -> Result<Json<RecordResponse>, ApiError> {
    let query = RecordQuery {
        bearing: params.bearing,
        since: params.since,
        until: params.until,
        limit: params.limit.min(MAX_LIMIT),
    };
    let data = state.repository.query(&query)?;

    Ok(Json(RecordResponse {
        count: data.len(),
        data,
    }))
}
