//! Prediction Statistics

use serde::{Deserialize, Serialize};

/// Probability at or above which a prediction counts as high risk
pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 0.75;

/// Summary of a batch of predicted probabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionStats {
    pub mean_probability: f64,
    /// Population standard deviation
    pub std_probability: f64,
    /// Fraction of predictions `>= high_risk_threshold`
    pub high_risk_rate: f64,
}

/// Mean, population std and high-risk rate; an empty batch is all zeros
pub fn summarize_predictions(probabilities: &[f64], high_risk_threshold: f64) -> PredictionStats {
    if probabilities.is_empty() {
        return PredictionStats::default();
    }

    let n = probabilities.len() as f64;
    let mean = probabilities.iter().sum::<f64>() / n;
    let variance = probabilities.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let high = probabilities
        .iter()
        .filter(|&&p| p >= high_risk_threshold)
        .count();

    PredictionStats {
        mean_probability: mean,
        std_probability: variance.sqrt(),
        high_risk_rate: high as f64 / n,
    }
}

/// Prediction monitor bound to a high-risk threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionMonitor {
    pub high_risk_threshold: f64,
}

impl Default for PredictionMonitor {
    fn default() -> Self {
        Self {
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
        }
    }
}

impl PredictionMonitor {
    pub fn new(high_risk_threshold: f64) -> Self {
        Self {
            high_risk_threshold,
        }
    }

    pub fn summarize(&self, probabilities: &[f64]) -> PredictionStats {
        summarize_predictions(probabilities, self.high_risk_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_batch_is_zero() {
        let stats = PredictionMonitor::default().summarize(&[]);
        assert_eq!(stats, PredictionStats::default());
        assert_eq!(stats.mean_probability, 0.0);
        assert_eq!(stats.std_probability, 0.0);
        assert_eq!(stats.high_risk_rate, 0.0);
    }

    #[test]
    fn test_high_risk_rate() {
        let stats = PredictionMonitor::default().summarize(&[0.1, 0.2, 0.8, 0.9]);
        assert_eq!(stats.high_risk_rate, 0.5);
        assert!((stats.mean_probability - 0.5).abs() < 1e-12);
        // population std: sqrt((0.16 + 0.09 + 0.09 + 0.16) / 4)
        assert!((stats.std_probability - 0.125f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let stats = summarize_predictions(&[0.75, 0.74], 0.75);
        assert_eq!(stats.high_risk_rate, 0.5);
    }

    proptest! {
        #[test]
        fn stats_are_bounded(probs in prop::collection::vec(0.0f64..=1.0, 0..100)) {
            let stats = PredictionMonitor::default().summarize(&probs);
            prop_assert!((0.0..=1.0).contains(&stats.high_risk_rate));
            prop_assert!(stats.mean_probability >= 0.0 && stats.mean_probability <= 1.0 + 1e-12);
            prop_assert!(stats.std_probability >= 0.0 && stats.std_probability <= 0.5 + 1e-12);
        }
    }
}
