//! Health Route

use axum::{extract::State, Json};
use inference_engine::ModelBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model_path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub backend: Option<ModelBackend>,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Health check handler; attempts the lazy model load
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let artifact = state.model.get().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: artifact.is_some(),
        model_path: state.model.path().display().to_string(),
        backend: artifact.map(|a| a.backend),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
