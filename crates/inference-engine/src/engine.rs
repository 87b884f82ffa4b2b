//! Inference Engine Implementation

use crate::artifact::ModelArtifact;
use crate::classifier::{Classifier, ModelBackend};
use crate::heuristic::HeuristicClassifier;
use crate::InferenceError;
use fallback::FallbackScorer;
use feature_engine::{FeatureMatrix, FeatureVector};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Result of inference operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Failure probability in [0, 1]
    pub probability: f64,
    /// Whether the heuristic scored this row
    pub used_fallback: bool,
    /// Backend that produced the score
    pub backend: ModelBackend,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Single-row matrix holding `feature_list` values in order
pub fn select_features(
    features: &FeatureVector,
    feature_list: &[String],
) -> Result<Array2<f64>, InferenceError> {
    let values = feature_list
        .iter()
        .map(|name| {
            features
                .get(name)
                .ok_or_else(|| InferenceError::UnknownFeature(name.clone()))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(Array1::from(values).insert_axis(Axis(0)))
}

/// Failure probability from the model, or from the heuristic when absent
pub fn predict_probability(
    artifact: Option<&ModelArtifact>,
    features: &FeatureVector,
) -> Result<f64, InferenceError> {
    match artifact {
        Some(artifact) => {
            let row = select_features(features, &artifact.features)?;
            let proba = artifact.classifier().predict_proba(row.view())?;
            let p = proba.first().copied().ok_or(InferenceError::FeatureCountMismatch {
                expected: 1,
                actual: 0,
            })?;
            Ok(p.clamp(0.0, 1.0))
        }
        None => Ok(FallbackScorer::new().score_features(features)),
    }
}

/// Scores feature rows against an optional model artifact
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine;

impl InferenceEngine {
    /// Create a new inference engine
    pub fn new() -> Self {
        Self
    }

    /// Score one row
    pub fn predict(
        &self,
        artifact: Option<&ModelArtifact>,
        features: &FeatureVector,
    ) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();
        let probability = predict_probability(artifact, features)?;
        let latency_us = start.elapsed().as_micros() as u64;

        let (backend, used_fallback) = match artifact {
            Some(artifact) => (artifact.backend, false),
            None => (ModelBackend::Heuristic, true),
        };
        debug!(
            "Inference completed in {}us (backend={}, p={:.4})",
            latency_us, backend, probability
        );

        Ok(InferenceResult {
            probability,
            used_fallback,
            backend,
            latency_us,
        })
    }

    /// Score every row of a named matrix
    pub fn predict_batch(
        &self,
        artifact: Option<&ModelArtifact>,
        features: &FeatureMatrix,
    ) -> Result<Array1<f64>, InferenceError> {
        match artifact {
            Some(artifact) => {
                let selected = features.select(&artifact.features)?;
                artifact.classifier().predict_proba(selected.values().view())
            }
            None => HeuristicClassifier::for_features(features.names())?
                .predict_proba(features.values().view()),
        }
    }
}
