//! Admin Routes

use axum::{extract::State, Json};
use inference_engine::ModelBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;

/// Outcome of a model reload
#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub model_loaded: bool,
    pub model_path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub backend: Option<ModelBackend>,
}

/// Re-read the artifact from disk, replacing whatever was cached
pub async fn reload_model(State(state): State<Arc<AppState>>) -> Json<ReloadResponse> {
    let artifact = state.model.reload().await;
    match &artifact {
        Some(artifact) => info!("Reloaded model {} ({})", artifact.model_id, artifact.backend),
        None => warn!("Reload found no usable model, serving fallback scores"),
    }

    Json(ReloadResponse {
        model_loaded: artifact.is_some(),
        model_path: state.model.path().display().to_string(),
        backend: artifact.map(|a| a.backend),
    })
}
