//! Distribution Drift

use sensor_data::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Significance level below which a column counts as drifted
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Two-sample KS statistic and its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsTest {
    /// Largest gap between the two empirical CDFs
    pub statistic: f64,
    pub p_value: f64,
}

/// Largest `n * m` for which the p-value is computed exactly
pub const EXACT_SIZE_LIMIT: usize = 10_000;

/// Two-sample Kolmogorov-Smirnov test
///
/// NaNs are dropped first. Returns `None` when either sample is then empty.
/// When `n * m <= EXACT_SIZE_LIMIT` the p-value is exact, from counting the
/// lattice paths that keep the two empirical CDFs closer than `D`. Larger
/// samples use the asymptotic Kolmogorov distribution evaluated at
/// `(sqrt(ne) + 0.12 + 0.11 / sqrt(ne)) * D` with `ne = n*m / (n+m)`.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> Option<KsTest> {
    let a = sorted_without_nan(reference);
    let b = sorted_without_nan(current);
    if a.is_empty() || b.is_empty() {
        return None;
    }

    // Gap in units of 1/(n*m) keeps the statistic exact
    let (n, m) = (a.len(), b.len());
    let (mut i, mut j) = (0, 0);
    let mut gap = 0;
    while i < n && j < m {
        let x = a[i].min(b[j]);
        while i < n && a[i] <= x {
            i += 1;
        }
        while j < m && b[j] <= x {
            j += 1;
        }
        gap = gap.max((i * m).abs_diff(j * n));
    }

    let statistic = gap as f64 / (n * m) as f64;
    let p_value = if n * m <= EXACT_SIZE_LIMIT {
        exact_p_value(n, m, gap)
    } else {
        let (n, m) = (n as f64, m as f64);
        let en = (n * m / (n + m)).sqrt();
        kolmogorov_survival((en + 0.12 + 0.11 / en) * statistic)
    };
    Some(KsTest { statistic, p_value })
}

/// `P(D >= gap / (n*m))` under the null, by dynamic programming over the
/// `(n+1) x (m+1)` grid of partial sample counts
fn exact_p_value(n: usize, m: usize, gap: usize) -> f64 {
    if gap == 0 {
        return 1.0;
    }
    let inside = |i: usize, j: usize| (i * m).abs_diff(j * n) < gap;

    // Paths are counted in f64; C(n+m, n) stays finite for n*m <= 10_000
    let mut row = vec![0.0f64; m + 1];
    for i in 0..=n {
        for j in 0..=m {
            row[j] = if !inside(i, j) {
                0.0
            } else if i == 0 && j == 0 {
                1.0
            } else {
                let from_left = if j > 0 { row[j - 1] } else { 0.0 };
                let from_below = if i > 0 { row[j] } else { 0.0 };
                from_left + from_below
            };
        }
    }

    let total = binomial(n + m, n);
    (1.0 - row[m] / total).clamp(0.0, 1.0)
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

fn sorted_without_nan(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// `Q_KS(lambda) = 2 * sum_{k>=1} (-1)^(k-1) exp(-2 k^2 lambda^2)`
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let a2 = -2.0 * lambda * lambda;
    let mut sum = 0.0;
    let mut sign = 1.0;
    let mut previous = 0.0;
    for k in 1..=100u32 {
        let term = sign * 2.0 * (a2 * f64::from(k * k)).exp();
        sum += term;
        if term.abs() <= 0.001 * previous || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        sign = -sign;
        previous = term.abs();
    }
    // series failed to converge, which only happens for tiny lambda
    1.0
}

/// Drift verdict for one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    pub statistic: f64,
    pub p_value: f64,
    pub drift_detected: bool,
}

/// One entry per column compared, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriftReport {
    results: BTreeMap<String, DriftResult>,
}

impl DriftReport {
    pub fn get(&self, feature: &str) -> Option<&DriftResult> {
        self.results.get(feature)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DriftResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of drifted columns
    pub fn drifted(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, r)| r.drift_detected)
            .map(|(name, _)| name)
    }
}

/// KS drift check across the numeric columns two frames share
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftDetector {
    pub alpha: f64,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl DriftDetector {
    /// Create a new drift detector
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Compare every column numeric in both frames
    pub fn compare(&self, reference: &Frame, current: &Frame) -> DriftReport {
        let mut results = BTreeMap::new();

        for (name, column) in reference.iter() {
            let (Some(ref_values), Some(cur_values)) = (column.as_numeric(), current.numeric(name))
            else {
                debug!("Skipping column {} (not numeric in both frames)", name);
                continue;
            };
            let Some(test) = ks_two_sample(ref_values, cur_values) else {
                debug!("Skipping column {} (no observed values)", name);
                continue;
            };

            let drift_detected = test.p_value < self.alpha;
            if drift_detected {
                warn!(
                    "Drift detected in {}: D = {:.4}, p = {:.3e}",
                    name, test.statistic, test.p_value
                );
            }
            results.insert(
                name.to_string(),
                DriftResult {
                    statistic: test.statistic,
                    p_value: test.p_value,
                    drift_detected,
                },
            );
        }

        DriftReport { results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sensor_data::Column;

    fn frame(columns: &[(&str, Column)]) -> Frame {
        let mut frame = Frame::new();
        for (name, column) in columns {
            frame.push_column(*name, column.clone()).unwrap();
        }
        frame
    }

    fn range(start: usize, len: usize) -> Vec<f64> {
        (start..start + len).map(|v| v as f64).collect()
    }

    #[test]
    fn test_identical_samples() {
        let values = range(0, 200);
        let test = ks_two_sample(&values, &values).unwrap();
        assert_eq!(test.statistic, 0.0);
        assert_eq!(test.p_value, 1.0);
    }

    #[test]
    fn test_disjoint_support() {
        let test = ks_two_sample(&range(0, 100), &range(1000, 100)).unwrap();
        assert_eq!(test.statistic, 1.0);
        assert!(test.p_value < 1e-10);
    }

    #[test]
    fn test_statistic_handles_ties() {
        let test = ks_two_sample(&[1.0, 2.0, 2.0, 3.0], &[2.0, 2.0, 2.0, 2.0]).unwrap();
        // CDFs differ most just below 2 (0.25 vs 0) and at 2 (0.75 vs 1)
        assert!((test.statistic - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_exact_p_value_small_samples() {
        // n = m = 10, D = 0.6: 1 - 4740 / C(20, 10)
        let test = ks_two_sample(&range(0, 10), &range(6, 10)).unwrap();
        assert!((test.statistic - 0.6).abs() < 1e-12);
        assert!((test.p_value - 0.052_447_552).abs() < 1e-6);

        let reference = frame(&[("torque", Column::Numeric(range(0, 10)))]);
        let current = frame(&[("torque", Column::Numeric(range(6, 10)))]);
        let report = DriftDetector::default().compare(&reference, &current);
        assert!(!report.get("torque").unwrap().drift_detected);
    }

    #[test]
    fn test_exact_p_value_unequal_sizes() {
        // Only the 2 paths that exhaust one sample first reach D = 1
        let test = ks_two_sample(&[1.0, 2.0], &[3.0, 4.0, 5.0]).unwrap();
        assert_eq!(test.statistic, 1.0);
        assert!((test.p_value - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_asymptotic_p_value_large_samples() {
        // D = 0.5 with n = m = 200: lambda = (sqrt(100) + 0.12 + 0.11/sqrt(100)) * 0.5
        let test = ks_two_sample(&range(0, 200), &range(100, 200)).unwrap();
        assert!((test.statistic - 0.5).abs() < 1e-12);
        let en = 10.0;
        let lambda = (en + 0.12 + 0.11 / en) * 0.5;
        let expected: f64 = (1..=50)
            .map(|k: i32| 2.0 * (-1f64).powi(k - 1) * (-2.0 * f64::from(k * k) * lambda * lambda).exp())
            .sum();
        assert!((test.p_value - expected).abs() < 1e-6);
    }

    #[test]
    fn test_nan_values_are_dropped() {
        let test = ks_two_sample(&[1.0, f64::NAN, 2.0], &[1.0, 2.0]).unwrap();
        assert_eq!(test.statistic, 0.0);
        assert!(ks_two_sample(&[f64::NAN], &[1.0]).is_none());
        assert!(ks_two_sample(&[], &[1.0]).is_none());
    }

    #[test]
    fn test_report_skips_unshared_and_text_columns() {
        let reference = frame(&[
            ("torque", Column::Numeric(range(0, 50))),
            ("tool_wear", Column::Numeric(range(0, 50))),
            ("type", Column::Text(vec!["L".into(); 50])),
            ("reference_only", Column::Numeric(range(0, 50))),
        ]);
        let current = frame(&[
            ("torque", Column::Numeric(range(0, 50))),
            ("tool_wear", Column::Numeric(range(500, 50))),
            ("type", Column::Text(vec!["M".into(); 50])),
            ("current_only", Column::Numeric(range(0, 50))),
        ]);

        let report = DriftDetector::default().compare(&reference, &current);
        assert_eq!(report.len(), 2);
        assert!(!report.get("torque").unwrap().drift_detected);
        assert!(report.get("tool_wear").unwrap().drift_detected);
        assert_eq!(report.drifted().collect::<Vec<_>>(), vec!["tool_wear"]);
        assert!(report.get("type").is_none());
    }

    proptest! {
        #[test]
        fn p_value_in_unit_interval(
            a in prop::collection::vec(-1e3f64..1e3, 1..60),
            b in prop::collection::vec(-1e3f64..1e3, 1..60),
        ) {
            let test = ks_two_sample(&a, &b).unwrap();
            prop_assert!((0.0..=1.0).contains(&test.p_value));
            prop_assert!((0.0..=1.0).contains(&test.statistic));
        }
    }
}
