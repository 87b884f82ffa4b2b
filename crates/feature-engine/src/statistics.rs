//! Statistical Helpers

use serde::{Deserialize, Serialize};

/// Summary statistics of a numeric sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Number of values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation (denominator N)
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// 95th percentile
    pub p95: f64,
}

impl SummaryStatistics {
    /// Compute summary statistics; an empty slice yields all zeros
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            p95: quantile(values, 0.95).unwrap_or(0.0),
        }
    }
}

/// Quantile with linear interpolation between order statistics
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Mean over a trailing window ending at each position
///
/// The window shrinks at the start of the sequence, so the first value is
/// always returned unchanged.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Previous value at each position; the first position is back-filled
pub fn lag_backfill(values: &[f64]) -> Vec<f64> {
    match values.first() {
        Some(&first) => std::iter::once(first)
            .chain(values[..values.len() - 1].iter().copied())
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = SummaryStatistics::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert_eq!(stats.count, 5);
    }

    #[test]
    fn test_std_dev_computation() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = SummaryStatistics::compute(&values);
        // population std dev of this sample is exactly 2
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_empty_values() {
        let stats = SummaryStatistics::compute(&[]);
        assert_eq!(stats, SummaryStatistics::default());
    }

    #[test]
    fn test_quantile_interpolates() {
        let values: Vec<f64> = (1..=21).map(f64::from).collect();
        assert_eq!(quantile(&values, 0.95), Some(20.0));
        assert_eq!(quantile(&[1.0, 2.0], 0.5), Some(1.5));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_rolling_mean_shrinks_at_start() {
        let rolled = rolling_mean(&[2.0, 4.0, 6.0], 2);
        assert_eq!(rolled, vec![2.0, 3.0, 5.0]);
        assert!(rolling_mean(&[], 5).is_empty());
    }

    #[test]
    fn test_lag_backfill() {
        assert_eq!(lag_backfill(&[1.0, 2.0, 3.0]), vec![1.0, 1.0, 2.0]);
        assert_eq!(lag_backfill(&[7.0]), vec![7.0]);
        assert!(lag_backfill(&[]).is_empty());
    }
}
