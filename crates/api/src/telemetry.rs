//! Prometheus Metrics

use crate::{ApiError, ApiResult, AppState};
use axum::extract::State;
use explainer::ExplanationMethod;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use risk_bucketer::RiskLevel;
use std::sync::Arc;
use tracing::info;

pub const PREDICTIONS_TOTAL: &str = "pdm_predictions_total";
pub const FAILURE_PROBABILITY: &str = "pdm_failure_probability";
pub const EXPLANATIONS_TOTAL: &str = "pdm_explanations_total";

/// Install the global Prometheus recorder
pub fn install_recorder() -> ApiResult<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::InvalidConfig(format!("metrics recorder: {e}")))?;

    metrics::describe_counter!(PREDICTIONS_TOTAL, "Predictions served");
    metrics::describe_histogram!(FAILURE_PROBABILITY, "Served failure probabilities");
    metrics::describe_counter!(EXPLANATIONS_TOTAL, "Explanations served");

    info!("Prometheus metrics initialized");
    Ok(handle)
}

pub fn record_prediction(level: RiskLevel, used_fallback: bool, probability: f64) {
    let source = if used_fallback { "fallback" } else { "model" };
    metrics::counter!(PREDICTIONS_TOTAL, "risk_level" => level.as_str(), "source" => source)
        .increment(1);
    metrics::histogram!(FAILURE_PROBABILITY).record(probability);
}

pub fn record_explanation(method: ExplanationMethod) {
    metrics::counter!(EXPLANATIONS_TOTAL, "method" => method.as_str()).increment(1);
}

/// `GET /metrics` in the Prometheus text format
pub async fn render(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::MetricsDisabled)
}
