//! Classifier Trait

use crate::InferenceError;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model family that produced a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    /// Gradient-boosted regression trees on the logistic loss
    GradientBoosting,
    /// Class-weighted logistic regression
    LogisticRegression,
    /// Deterministic torque/tool-wear rule
    Heuristic,
}

impl ModelBackend {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelBackend::GradientBoosting => "gradient_boosting",
            ModelBackend::LogisticRegression => "logistic_regression",
            ModelBackend::Heuristic => "heuristic",
        }
    }

    /// Parse a configured backend name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gradient_boosting" => Some(ModelBackend::GradientBoosting),
            "logistic_regression" => Some(ModelBackend::LogisticRegression),
            "heuristic" => Some(ModelBackend::Heuristic),
            _ => None,
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact per-feature attribution of one prediction, in log-odds space
///
/// `baseline + contributions.sum()` equals the model's raw margin for the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Expected margin over the training distribution
    pub baseline: f64,
    /// Signed contribution per input column
    pub contributions: Vec<f64>,
}

impl Attribution {
    /// Margin reconstructed from baseline and contributions
    pub fn margin(&self) -> f64 {
        self.baseline + self.contributions.iter().sum::<f64>()
    }
}

/// Probabilistic binary classifier over a fixed-width feature row
pub trait Classifier: Send + Sync {
    /// Backend tag
    fn backend(&self) -> ModelBackend;

    /// Number of input columns
    fn n_features(&self) -> usize;

    /// Probability of the failure class for each row
    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError>;

    /// Whether [`Classifier::attribute`] computes exact contributions
    fn supports_attribution(&self) -> bool {
        false
    }

    /// Exact contributions for one row
    fn attribute(&self, _row: ArrayView1<'_, f64>) -> Result<Attribution, InferenceError> {
        Err(InferenceError::AttributionUnsupported(self.backend()))
    }
}

/// Logistic function
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn check_width(expected: usize, actual: usize) -> Result<(), InferenceError> {
    if expected != actual {
        return Err(InferenceError::FeatureCountMismatch { expected, actual });
    }
    Ok(())
}

/// Shared preconditions for fitting a binary classifier
pub(crate) fn check_training_inputs(x: ArrayView2<'_, f64>, y: &[bool]) -> Result<(), InferenceError> {
    let (rows, cols) = x.dim();
    if rows == 0 {
        return Err(InferenceError::EmptyTrainingSet);
    }
    if cols == 0 {
        return Err(InferenceError::InvalidParams("training matrix has no feature columns".into()));
    }
    if y.len() != rows {
        return Err(InferenceError::LabelMismatch { rows, labels: y.len() });
    }
    let positives = y.iter().filter(|&&label| label).count();
    if positives == 0 || positives == rows {
        return Err(InferenceError::SingleClass);
    }
    Ok(())
}

/// Per-row sample weights with positives up-weighted
pub(crate) fn class_weights(y: &[bool], scale_pos_weight: f64) -> Vec<f64> {
    y.iter()
        .map(|&label| if label { scale_pos_weight } else { 1.0 })
        .collect()
}
