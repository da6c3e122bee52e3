//! API error types and their HTTP mapping

use anomaly_scorer::ScorerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use feature_engine::FeatureError;
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("No model for bearing {0}")]
    ModelNotFound(usize),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Scorer(#[from] ScorerError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelNotFound(_) | ApiError::Storage(StorageError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Feature(FeatureError::DegenerateSignal(_))
            | ApiError::Feature(FeatureError::InsufficientData { .. })
            | ApiError::Scorer(ScorerError::InvalidInputShape { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Scorer(ScorerError::FeatureMismatch(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the record key of the request that failed
    pub fn with_id(self, id: impl Into<String>) -> ErrorResponse {
        ErrorResponse {
            error: self,
            id: Some(id.into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

/// Error plus the optional request key it belongs to
#[derive(Debug)]
pub struct ErrorResponse {
    pub error: ApiError,
    pub id: Option<String>,
}

impl From<ApiError> for ErrorResponse {
    fn from(error: ApiError) -> Self {
        Self { error, id: None }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.error);
        } else {
            tracing::warn!("Request rejected: {}", self.error);
        }
        metrics::counter!("bearing_request_errors_total", "status" => status.as_u16().to_string())
            .increment(1);

        let body = ErrorBody {
            error: self.error.to_string(),
            id: self.id,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}
