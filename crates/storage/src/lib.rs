//! Storage Layer
//!
//! Binary persistence of model artifacts, the shared lazily loaded model
//! handle used by the serving process, and a bounded in-memory log of served
//! predictions.

mod artifact_store;
mod model_cache;
mod prediction_log;

pub use artifact_store::ArtifactStore;
pub use model_cache::{ModelCache, DEFAULT_RETRY_INTERVAL};
pub use prediction_log::{PredictionLog, PredictionRecord, DEFAULT_LOG_CAPACITY};

use inference_engine::InferenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found at {0}")]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] postcard::Error),
    #[error("Artifact format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(#[from] InferenceError),
    #[error("Lock error: {0}")]
    Lock(String),
}
