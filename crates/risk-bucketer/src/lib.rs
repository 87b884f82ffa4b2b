//! Risk Bucketing
//!
//! Maps failure probabilities to discrete risk levels and derives a
//! horizon-adjusted risk for a fixed number of days.

mod buckets;

pub use buckets::{bucket, horizon_risk, RiskLevel, RiskThresholds, DEFAULT_HORIZON_DAYS};

use thiserror::Error;

/// Invalid threshold configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskConfigError {
    #[error("Threshold {name} = {value} is outside [0, 1]")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("Medium threshold {medium} exceeds high threshold {high}")]
    Inverted { medium: f64, high: f64 },
}
