//! Failure-Risk Inference Engine
//!
//! Binary failure classifiers behind a common [`Classifier`] trait, the
//! serialized [`ModelArtifact`], and the scoring entry point that falls back to
//! the deterministic heuristic when no model is loaded.
//!
//! Fitting gradient-boosted trees needs the `gradient-boosting` feature;
//! scoring and attributing an already trained ensemble does not.

mod artifact;
#[cfg(feature = "gradient-boosting")]
mod boosting;
mod classifier;
mod engine;
mod gbdt;
mod heuristic;
mod logistic;

pub use artifact::{ModelArtifact, ModelMetrics, TrainedModel, ARTIFACT_FORMAT_VERSION};
pub use classifier::{sigmoid, Attribution, Classifier, ModelBackend};
pub use engine::{predict_probability, select_features, InferenceEngine, InferenceResult};
pub use gbdt::{GradientBoostedTrees, GradientBoostingParams, RegressionTree, TreeNode};
pub use heuristic::HeuristicClassifier;
pub use logistic::{LogisticModel, LogisticParams};

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during training, scoring or attribution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Artifact feature list references unknown column: {0}")]
    UnknownFeature(String),
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error("Training labels contain a single class")]
    SingleClass,
    #[error("Label count {labels} does not match row count {rows}")]
    LabelMismatch { rows: usize, labels: usize },
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(String),
    #[error("Model fitting failed: {0}")]
    FitFailed(String),
    #[error("Backend {0} does not provide exact attribution")]
    AttributionUnsupported(ModelBackend),
    #[error("Attribution failed: {0}")]
    AttributionFailed(String),
}

impl From<FeatureError> for InferenceError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::UnknownFeature(name) => InferenceError::UnknownFeature(name),
            FeatureError::ShapeMismatch { expected, actual } => {
                InferenceError::FeatureCountMismatch { expected, actual }
            }
            FeatureError::RowOutOfBounds { index, rows } => {
                InferenceError::InvalidParams(format!("row {index} out of bounds for {rows} rows"))
            }
        }
    }
}
