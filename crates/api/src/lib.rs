//! Predictive Maintenance API Server
//!
//! REST API serving failure-risk predictions, local explanations and
//! prediction monitoring over the lazily loaded model artifact. A retrained
//! artifact is picked up through `POST /admin/reload`.

use axum::{
    routing::{get, post},
    Router,
};
use data_validator::Validator;
use explainer::ExplainerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use risk_bucketer::RiskThresholds;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use storage::{ModelCache, PredictionLog};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod routes;
mod settings;
mod telemetry;

pub use error::{ApiError, ApiResult};
pub use routes::predictions::{ExplainedPredictionResponse, PredictionResponse, UNTRAINED_NOTE};
pub use settings::ServeConfig;
pub use telemetry::install_recorder;

/// Application state shared across handlers
pub struct AppState {
    /// Lazily loaded model artifact
    pub model: ModelCache,
    /// Bounded log of served probabilities
    pub predictions: PredictionLog,
    pub thresholds: RiskThresholds,
    pub validator: Validator,
    pub explainer: ExplainerConfig,
    pub top_k: usize,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state; the model is not read until first use
    pub fn new(config: &ServeConfig) -> Self {
        Self {
            model: ModelCache::new(&config.model_path),
            predictions: PredictionLog::new(config.prediction_log_capacity),
            thresholds: config.risk,
            validator: Validator::new(config.validation.clone()),
            explainer: config.explainer,
            top_k: config.top_k,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/predict", post(routes::predictions::predict))
        .route(
            "/predict_with_explanation",
            post(routes::predictions::predict_with_explanation),
        )
        .route(
            "/monitoring/predictions",
            get(routes::monitoring::prediction_summary),
        )
        .route("/metrics", get(telemetry::render))
        .route("/admin/reload", post(routes::admin::reload_model))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server
pub async fn run_server(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
