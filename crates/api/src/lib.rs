//! Bearing Health Service
//!
//! HTTP scoring service for bearing vibration windows, plus the batch
//! featurize and train stages driven by the `bearing-pipeline` CLI.

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
pub mod pipeline;
mod routes;
mod state;

pub use config::ServiceConfig;
pub use error::{ApiError, ErrorResponse};
pub use routes::invocations::{InvocationRequest, InvocationResponse};
pub use state::AppState;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/invocations", post(routes::invocations::invoke))
        .route("/ping", get(routes::health::ping))
        .route("/metrics", get(routes::health::metrics))
        .route("/api/v1/records", get(routes::records::get_records))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Run the server until it is shut down
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let metrics = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(&config)?.with_metrics(metrics));
    let app = create_router(state);

    info!(
        "Starting bearing service on {} (models in {})",
        config.bind_addr,
        config.model_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anomaly_scorer::{AnomalyScorer, ScorerConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use feature_engine::{FeatureAssembler, FeatureConfig, FeatureVector, WindowKind};
    use serde_json::{json, Value};
    use std::f64::consts::PI;
    use std::path::Path;
    use storage::{HealthRecord, ModelStore};
    use tower::ServiceExt;

    const RATE: u32 = 1024;

    fn window(amp: f64) -> Vec<f64> {
        (0..RATE as usize)
            .map(|k| {
                let t = k as f64 / RATE as f64;
                amp * (2.0 * PI * 60.0 * t).sin() + 0.01 * ((k * 31 % 97) as f64 / 97.0)
            })
            .collect()
    }

    fn config(model_dir: &Path) -> ServiceConfig {
        ServiceConfig {
            model_dir: model_dir.to_path_buf(),
            features: FeatureConfig::with_sampling_rate(RATE),
            ..Default::default()
        }
    }

    /// Train and save a model for bearing 1 on windows of amplitude 0.2..0.3
    fn seed_model(model_dir: &Path) {
        let assembler = FeatureAssembler::new(FeatureConfig::with_sampling_rate(RATE)).unwrap();
        let rows: Vec<FeatureVector> = (0..60)
            .map(|i| assembler.featurize(&window(0.2 + 0.1 * (i % 10) as f64 / 10.0)).unwrap())
            .collect();
        let scorer = AnomalyScorer::new(ScorerConfig {
            features: FeatureConfig::with_sampling_rate(RATE),
            ..Default::default()
        })
        .unwrap();
        let model = scorer.fit(&rows).unwrap();
        ModelStore::new(model_dir).save(1, &model.to_bytes().unwrap()).unwrap();
    }

    fn app(model_dir: &Path) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(&config(model_dir)).unwrap());
        (create_router(Arc::clone(&state)), state)
    }

    async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ping_without_models() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let (status, body) = get_json(app, "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": 200}));
    }

    #[tokio::test]
    async fn test_invocation_scores_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        seed_model(dir.path());
        let (app, state) = app(dir.path());

        let samples = window(0.25);
        let body = json!({"accelData": samples, "timeStamp": 1_076_581_959, "bearingNum": 1});
        let (status, body) = post_json(app, "/invocations", body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["_id"], "1076581959b1");
        assert_eq!(body["tS"], 1_076_581_959);
        assert_eq!(body["bN"], 1);
        assert!(body["hS"] == 0 || body["hS"] == 1);

        let expected_rms = state.assembler.featurize(&samples).unwrap().trms;
        let rms = body["rA"].as_f64().unwrap();
        assert!((rms - expected_rms).abs() <= 0.0005);

        let stored = state.repository.get("1076581959b1").unwrap();
        assert_eq!(stored, HealthRecord::new(1_076_581_959, 1, rms, stored.health));
    }

    #[tokio::test]
    async fn test_bearing_zero_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let body = json!({"accelData": window(0.2), "timeStamp": 1, "bearingNum": 0});
        let (status, _) = post_json(app, "/invocations", body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let truncated = "{\"accelData\": [1, 2".to_string();
        let (status, body) = post_json(app, "/invocations", truncated).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let body = json!({"accelData": window(0.2), "timeStamp": 7, "bearingNum": 3});
        let (status, body) = post_json(app, "/invocations", body.to_string()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["_id"], "7b3");
    }

    #[tokio::test]
    async fn test_model_from_other_feature_config_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        seed_model(dir.path());
        let mut config = config(dir.path());
        config.features.spectrum.window = WindowKind::Hann;
        let state = Arc::new(AppState::new(&config).unwrap());
        let app = create_router(Arc::clone(&state));

        let body = json!({"accelData": window(0.25), "timeStamp": 11, "bearingNum": 1});
        let (status, body) = post_json(app, "/invocations", body.to_string()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["_id"], "11b1");
        assert!(state.repository.is_empty());
    }

    #[tokio::test]
    async fn test_short_window_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        seed_model(dir.path());
        let (app, state) = app(dir.path());
        let body = json!({"accelData": [0.1, -0.1, 0.2], "timeStamp": 9, "bearingNum": 1});
        let (status, body) = post_json(app, "/invocations", body.to_string()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["_id"], "9b1");
        assert!(state.repository.is_empty());
    }

    #[tokio::test]
    async fn test_records_query() {
        let dir = tempfile::tempdir().unwrap();
        let (app, state) = app(dir.path());
        for ts in [100, 200, 300] {
            state.repository.upsert(HealthRecord::new(ts, 1, 0.1, 0)).unwrap();
            state.repository.upsert(HealthRecord::new(ts, 2, 0.2, 1)).unwrap();
        }

        let (status, body) = get_json(app, "/api/v1/records?bearing=2&since=200&limit=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["_id"], "300b2");
        assert_eq!(body["data"][1]["tS"], 200);
    }
}
