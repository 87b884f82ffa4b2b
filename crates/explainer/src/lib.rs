//! Prediction Explainer
//!
//! Signed per-feature contributions for a single prediction and a
//! magnitude-ranked importance summary over a batch. Models with exact
//! attribution are explained in log-odds space; all others get a
//! finite-difference sensitivity in probability space.

mod contributions;
mod explainer;
mod strategy;

pub use contributions::{Contributions, FeatureContribution};
pub use explainer::{Explainer, ExplainerConfig, Explanation};
pub use strategy::{
    perturbation_step, AttributionStrategy, ExactAttribution, ExplanationMethod,
    SensitivityAttribution,
};

use inference_engine::InferenceError;
use thiserror::Error;

/// Explainer errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplainError {
    #[error("Single-row explanation requires exactly one row, got {0}")]
    RowCount(usize),
    #[error("Cannot summarize an empty batch")]
    EmptyBatch,
    #[error("Model expects {expected} features, matrix has {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("Scoring failed: {0}")]
    Inference(#[from] InferenceError),
}
