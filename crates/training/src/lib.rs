//! Training Pipeline
//!
//! Loads the labelled dataset, builds features, splits it stratified by
//! class, fits the first available classifier backend, evaluates it on the
//! held-out split and writes the model artifact.

mod backend;
mod evaluate;
mod pipeline;
mod settings;
mod split;

pub use backend::{
    builder_for, resolve_builder, GradientBoostingBuilder, LogisticRegressionBuilder, ModelBuilder,
};
pub use evaluate::{average_precision, evaluate_binary, f1_score, roc_auc, ConfusionCounts};
pub use pipeline::{train, TrainingReport};
pub use settings::{CostWeights, TrainingConfig};
pub use split::{stratified_split, Split};

use explainer::ExplainError;
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use sensor_data::DataError;
use storage::StorageError;
use thiserror::Error;

/// Training errors
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Dataset contains no rows")]
    EmptyDataset,
    #[error("Training split contains a single class")]
    SingleClass,
    #[error("No training backend available (tried {0:?})")]
    NoBackendAvailable(Vec<String>),
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),
    #[error("Model error: {0}")]
    Model(#[from] InferenceError),
    #[error("Explainer error: {0}")]
    Explain(#[from] ExplainError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
