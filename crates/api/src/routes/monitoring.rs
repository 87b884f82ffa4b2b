//! Prediction Monitoring Route

use axum::{
    extract::{Query, State},
    Json,
};
use monitoring::{PredictionMonitor, PredictionStats};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::PredictionRecord;

use crate::{ApiResult, AppState};

/// Query parameters for the monitoring endpoint
#[derive(Debug, Deserialize)]
pub struct MonitoringQuery {
    /// Maximum number of recent records returned
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Statistics over every retained prediction plus the most recent records
#[derive(Debug, Serialize, Deserialize)]
pub struct MonitoringResponse {
    pub count: usize,
    pub stats: PredictionStats,
    pub recent: Vec<PredictionRecord>,
}

/// Summarize served predictions
pub async fn prediction_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonitoringQuery>,
) -> ApiResult<Json<MonitoringResponse>> {
    let probabilities = state.predictions.probabilities()?;
    let stats = PredictionMonitor::new(state.thresholds.high).summarize(&probabilities);
    let recent = state.predictions.recent(params.limit.min(500))?;

    Ok(Json(MonitoringResponse {
        count: probabilities.len(),
        stats,
        recent,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing;
    use axum::http::StatusCode;
    use risk_bucketer::RiskLevel;

    #[tokio::test]
    async fn test_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = testing::get(testing::state(dir.path()), "/monitoring/predictions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["stats"]["mean_probability"], 0.0);
        assert_eq!(body["recent"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_summary_over_logged_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let state = testing::state(dir.path());
        state.predictions.record(0.2, RiskLevel::Low, true).unwrap();
        state.predictions.record(0.8, RiskLevel::High, true).unwrap();

        let (status, body) = testing::get(state, "/monitoring/predictions?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["stats"]["mean_probability"], 0.5);
        assert_eq!(body["stats"]["high_risk_rate"], 0.5);
        assert_eq!(body["recent"][0]["risk_level"], "HIGH");
        assert_eq!(body["recent"].as_array().unwrap().len(), 1);
    }
}
