//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value must be strictly greater than zero
    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// Value must not be negative
    #[error("{field} must be greater than or equal to 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// NaN or infinite value
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// Value above the configured plausibility cap
    #[error("{field} value {value} exceeds maximum {max}")]
    AboveMaximum {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NotPositive { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::AboveMaximum { field, .. } => field,
        }
    }
}
