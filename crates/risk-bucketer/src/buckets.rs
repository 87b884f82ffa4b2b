//! Risk Levels and Thresholds

use crate::RiskConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Horizon used when none is given
pub const DEFAULT_HORIZON_DAYS: f64 = 30.0;

/// Discrete risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries; each band includes its lower bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Scores at or above this are HIGH (default: 0.75)
    pub high: f64,
    /// Scores at or above this are at least MEDIUM (default: 0.4)
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.75,
            medium: 0.4,
        }
    }
}

impl RiskThresholds {
    /// Create validated thresholds
    pub fn new(high: f64, medium: f64) -> Result<Self, RiskConfigError> {
        let thresholds = Self { high, medium };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Require `0 <= medium <= high <= 1`
    pub fn validate(&self) -> Result<(), RiskConfigError> {
        for (name, value) in [("high", self.high), ("medium", self.medium)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RiskConfigError::OutOfRange { name, value });
            }
        }
        if self.medium > self.high {
            return Err(RiskConfigError::Inverted {
                medium: self.medium,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Risk level of a score
    pub fn bucket(&self, score: f64) -> RiskLevel {
        let level = bucket(score, self.high, self.medium);
        debug!("Bucketed score {:.4} as {}", score, level);
        level
    }
}

/// `score >= high` is HIGH, else `score >= medium` is MEDIUM, else LOW
pub fn bucket(score: f64, high_threshold: f64, medium_threshold: f64) -> RiskLevel {
    if score >= high_threshold {
        RiskLevel::High
    } else if score >= medium_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Probability of failure within `horizon_days` under a constant daily hazard
///
/// The daily risk is `clamp(p / max(horizon_days, 1), 0, 1)`; the result is
/// `1 - exp(-daily * horizon_days)`.
pub fn horizon_risk(failure_probability: f64, horizon_days: f64) -> f64 {
    let horizon = horizon_days.max(0.0);
    let daily = (failure_probability / horizon.max(1.0)).clamp(0.0, 1.0);
    1.0 - (-daily * horizon).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries_are_inclusive_upward() {
        let t = RiskThresholds::default();
        assert_eq!(t.bucket(0.75), RiskLevel::High);
        assert_eq!(t.bucket(0.749999), RiskLevel::Medium);
        assert_eq!(t.bucket(0.4), RiskLevel::Medium);
        assert_eq!(t.bucket(0.399999), RiskLevel::Low);
        assert_eq!(t.bucket(0.0), RiskLevel::Low);
        assert_eq!(t.bucket(1.0), RiskLevel::High);
    }

    #[test]
    fn test_thresholds_are_overridable() {
        let t = RiskThresholds::new(0.9, 0.2).unwrap();
        assert_eq!(t.bucket(0.8), RiskLevel::Medium);
        assert_eq!(t.bucket(0.2), RiskLevel::Medium);
        assert_eq!(bucket(0.95, 0.9, 0.2), RiskLevel::High);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert_eq!(
            RiskThresholds::new(1.5, 0.4).unwrap_err(),
            RiskConfigError::OutOfRange { name: "high", value: 1.5 }
        );
        assert_eq!(
            RiskThresholds::new(0.3, 0.6).unwrap_err(),
            RiskConfigError::Inverted { medium: 0.6, high: 0.3 }
        );
        assert!(RiskThresholds::new(f64::NAN, 0.4).is_err());
    }

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"MEDIUM\"");
        let parsed: RiskLevel = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(parsed, RiskLevel::High);
    }

    #[test]
    fn test_horizon_risk() {
        assert_eq!(horizon_risk(0.0, DEFAULT_HORIZON_DAYS), 0.0);
        let r = horizon_risk(0.3, DEFAULT_HORIZON_DAYS);
        assert!((r - (1.0 - (-0.3f64).exp())).abs() < 1e-12);
        // horizons under one day do not inflate the daily rate
        assert!((horizon_risk(0.5, 0.5) - (1.0 - (-0.25f64).exp())).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn bucket_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let t = RiskThresholds::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.bucket(lo) <= t.bucket(hi));
        }

        #[test]
        fn horizon_risk_in_unit_interval(p in 0.0f64..=1.0, days in 0.0f64..3650.0) {
            let r = horizon_risk(p, days);
            prop_assert!((0.0..=1.0).contains(&r));
        }
    }
}
