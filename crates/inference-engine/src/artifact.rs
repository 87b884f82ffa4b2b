//! Model Artifact
//!
//! Everything the serving side needs to reproduce a training run's scores:
//! the fitted model, the ordered feature list it was trained on, and the
//! held-out metrics.

use crate::classifier::{Classifier, ModelBackend};
use crate::gbdt::GradientBoostedTrees;
use crate::logistic::LogisticModel;
use crate::InferenceError;
use chrono::{DateTime, Utc};
use feature_engine::FEATURE_COLUMNS;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bumped whenever the serialized layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Fitted model of any trainable backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    GradientBoosting(GradientBoostedTrees),
    LogisticRegression(LogisticModel),
}

impl TrainedModel {
    pub fn classifier(&self) -> &dyn Classifier {
        match self {
            TrainedModel::GradientBoosting(model) => model,
            TrainedModel::LogisticRegression(model) => model,
        }
    }

    pub fn backend(&self) -> ModelBackend {
        self.classifier().backend()
    }
}

/// Held-out evaluation metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub roc_auc: f64,
    pub pr_auc: f64,
    pub f1: f64,
    /// `10 * false negatives + 1 * false positives`
    pub expected_cost: f64,
}

/// Persisted training output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_id: Uuid,
    pub model: TrainedModel,
    /// Feature names in the exact column order the model was fitted on
    pub features: Vec<String>,
    pub metrics: Option<ModelMetrics>,
    pub backend: ModelBackend,
    pub trained_at: DateTime<Utc>,
    pub format_version: u32,
}

impl ModelArtifact {
    /// Create a new artifact; the feature list must fit the model
    pub fn new(
        model: TrainedModel,
        features: Vec<String>,
        metrics: Option<ModelMetrics>,
    ) -> Result<Self, InferenceError> {
        let artifact = Self {
            model_id: Uuid::new_v4(),
            backend: model.backend(),
            model,
            features,
            metrics,
            trained_at: Utc::now(),
            format_version: ARTIFACT_FORMAT_VERSION,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check the feature list against the known columns and the model width
    pub fn validate(&self) -> Result<(), InferenceError> {
        if let Some(unknown) = self
            .features
            .iter()
            .find(|name| !FEATURE_COLUMNS.contains(&name.as_str()))
        {
            return Err(InferenceError::UnknownFeature(unknown.clone()));
        }
        let expected = self.model.classifier().n_features();
        if self.features.len() != expected {
            return Err(InferenceError::FeatureCountMismatch {
                expected,
                actual: self.features.len(),
            });
        }
        Ok(())
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.model.classifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logistic::LogisticParams;
    use ndarray::Array2;

    fn logistic(n_features: usize) -> TrainedModel {
        let rows = 6;
        let flat: Vec<f64> = (0..rows * n_features).map(|i| (i / n_features) as f64).collect();
        let x = Array2::from_shape_vec((rows, n_features), flat).unwrap();
        let y = [false, false, false, true, true, true];
        TrainedModel::LogisticRegression(
            LogisticModel::fit(x.view(), &y, &LogisticParams::default()).unwrap(),
        )
    }

    #[test]
    fn test_new_records_backend() {
        let artifact = ModelArtifact::new(
            logistic(2),
            vec!["torque".into(), "tool_wear".into()],
            None,
        )
        .unwrap();
        assert_eq!(artifact.backend, ModelBackend::LogisticRegression);
        assert_eq!(artifact.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(artifact.classifier().n_features(), 2);
    }

    #[test]
    fn test_rejects_unknown_feature() {
        let err = ModelArtifact::new(logistic(2), vec!["torque".into(), "vibration".into()], None)
            .unwrap_err();
        assert_eq!(err, InferenceError::UnknownFeature("vibration".into()));
    }

    #[test]
    fn test_rejects_width_mismatch() {
        let err = ModelArtifact::new(logistic(3), vec!["torque".into()], None).unwrap_err();
        assert_eq!(err, InferenceError::FeatureCountMismatch { expected: 3, actual: 1 });
    }
}
