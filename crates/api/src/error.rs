//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use explainer::ExplainError;
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use risk_bucketer::RiskConfigError;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request validation failed")]
    Validation(Vec<ValidationError>),
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),
    #[error("Explainer error: {0}")]
    Explain(#[from] ExplainError),
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Metrics recorder is not installed")]
    MetricsDisabled,
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid risk thresholds: {0}")]
    RiskConfig(#[from] RiskConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(errors) => {
                let details: Vec<_> = errors
                    .iter()
                    .map(|e| json!({ "field": e.field(), "message": e.to_string() }))
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": self.to_string(), "details": details }),
                )
            }
            ApiError::MetricsDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": self.to_string() }),
            ),
            _ => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": self.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
