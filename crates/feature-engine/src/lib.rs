//! Feature Engineering Engine
//!
//! Turns time-ordered sensor readings into the fixed, named feature vector
//! consumed by the failure classifier.

mod features;
mod matrix;
mod statistics;

pub use features::{FeatureBuilder, FeatureVector, FEATURE_COLUMNS, FEATURE_DIMENSION, ROLL_WINDOW};
pub use matrix::FeatureMatrix;
pub use statistics::{lag_backfill, quantile, rolling_mean, SummaryStatistics};

use thiserror::Error;

/// Errors while shaping feature data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Unknown feature column: {0}")]
    UnknownFeature(String),
    #[error("Feature shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("Row index {index} out of bounds for {rows} rows")]
    RowOutOfBounds { index: usize, rows: usize },
}
