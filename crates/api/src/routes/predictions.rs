//! Prediction Routes

use axum::{extract::State, Json};
use explainer::{Explainer, ExplanationMethod, FeatureContribution};
use feature_engine::{FeatureBuilder, FeatureMatrix, FeatureVector};
use inference_engine::{Classifier, HeuristicClassifier, InferenceEngine, ModelArtifact};
use risk_bucketer::{horizon_risk, RiskLevel, DEFAULT_HORIZON_DAYS};
use sensor_data::SensorReading;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{telemetry, ApiError, ApiResult, AppState};

/// Attached to explanations served without a trained model
pub const UNTRAINED_NOTE: &str = "Train model to enable local explanations.";

/// Response for `/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Rounded to 4 decimals
    pub failure_probability: f64,
    pub risk_level: RiskLevel,
    /// Chance of failure within `DEFAULT_HORIZON_DAYS`, rounded to 4 decimals
    pub horizon_risk: f64,
}

/// Response for `/predict_with_explanation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainedPredictionResponse {
    pub failure_probability: f64,
    pub risk_level: RiskLevel,
    pub horizon_risk: f64,
    pub method: ExplanationMethod,
    pub top_contributors: Vec<FeatureContribution>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

struct Scored {
    features: FeatureVector,
    artifact: Option<Arc<ModelArtifact>>,
    probability: f64,
    risk_level: RiskLevel,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Validate, build features, score, bucket and log one reading
async fn score(state: &AppState, reading: &SensorReading) -> ApiResult<Scored> {
    state
        .validator
        .check(reading)
        .into_result()
        .map_err(ApiError::Validation)?;

    let features = FeatureBuilder::new().build_one(reading);
    let artifact = state.model.get().await;
    let result = InferenceEngine::new().predict(artifact.as_deref(), &features)?;
    let risk_level = state.thresholds.bucket(result.probability);

    if let Err(err) = state
        .predictions
        .record(result.probability, risk_level, result.used_fallback)
    {
        warn!("Prediction not logged: {}", err);
    }
    telemetry::record_prediction(risk_level, result.used_fallback, result.probability);

    Ok(Scored {
        features,
        artifact,
        probability: result.probability,
        risk_level,
    })
}

/// Score one reading
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<SensorReading>,
) -> ApiResult<Json<PredictionResponse>> {
    let scored = score(&state, &reading).await?;

    Ok(Json(PredictionResponse {
        failure_probability: round4(scored.probability),
        risk_level: scored.risk_level,
        horizon_risk: round4(horizon_risk(scored.probability, DEFAULT_HORIZON_DAYS)),
    }))
}

/// Score one reading and attribute the score to its features
///
/// Without a model the fallback rule is explained by sensitivity analysis and
/// the response carries [`UNTRAINED_NOTE`].
pub async fn predict_with_explanation(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<SensorReading>,
) -> ApiResult<Json<ExplainedPredictionResponse>> {
    let scored = score(&state, &reading).await?;
    let all = FeatureMatrix::from_vectors(std::slice::from_ref(&scored.features));

    let heuristic;
    let (classifier, row, note): (&dyn Classifier, FeatureMatrix, Option<String>) =
        match &scored.artifact {
            Some(artifact) => (artifact.classifier(), all.select(&artifact.features)?, None),
            None => {
                heuristic = HeuristicClassifier::for_features(all.names())?;
                (&heuristic, all, Some(UNTRAINED_NOTE.to_string()))
            }
        };

    let explanation = Explainer::for_model(classifier, &state.explainer).explain(classifier, &row)?;
    telemetry::record_explanation(explanation.method);
    debug!(
        "Explained prediction with {} attribution",
        explanation.method.as_str()
    );

    Ok(Json(ExplainedPredictionResponse {
        failure_probability: round4(scored.probability),
        risk_level: scored.risk_level,
        horizon_risk: round4(horizon_risk(scored.probability, DEFAULT_HORIZON_DAYS)),
        method: explanation.method,
        top_contributors: explanation.contributions.top(state.top_k),
        note,
    }))
}
