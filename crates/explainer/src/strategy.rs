//! Attribution Strategies

use inference_engine::{Classifier, InferenceError};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// How contributions were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationMethod {
    /// Model-native attribution in log-odds space
    Exact,
    /// Finite-difference probability shift per feature
    Sensitivity,
    /// Mean absolute probability shift after shuffling one column
    Permutation,
}

impl ExplanationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationMethod::Exact => "exact",
            ExplanationMethod::Sensitivity => "sensitivity",
            ExplanationMethod::Permutation => "permutation",
        }
    }
}

/// Computes local contributions and batch importances for a classifier
pub trait AttributionStrategy: Send + Sync {
    /// Method reported for single-row explanations
    fn method(&self) -> ExplanationMethod;

    /// Method reported for batch summaries
    fn summary_method(&self) -> ExplanationMethod;

    /// Signed contribution per column of one row
    fn explain_row(
        &self,
        model: &dyn Classifier,
        row: ArrayView1<'_, f64>,
    ) -> Result<Vec<f64>, InferenceError>;

    /// Non-negative importance per column over a batch
    fn importance(
        &self,
        model: &dyn Classifier,
        batch: ArrayView2<'_, f64>,
    ) -> Result<Vec<f64>, InferenceError>;
}

/// Delegates to the model's exact attribution
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactAttribution;

impl AttributionStrategy for ExactAttribution {
    fn method(&self) -> ExplanationMethod {
        ExplanationMethod::Exact
    }

    fn summary_method(&self) -> ExplanationMethod {
        ExplanationMethod::Exact
    }

    fn explain_row(
        &self,
        model: &dyn Classifier,
        row: ArrayView1<'_, f64>,
    ) -> Result<Vec<f64>, InferenceError> {
        Ok(model.attribute(row)?.contributions)
    }

    fn importance(
        &self,
        model: &dyn Classifier,
        batch: ArrayView2<'_, f64>,
    ) -> Result<Vec<f64>, InferenceError> {
        let mut totals = vec![0.0; batch.ncols()];
        for row in batch.rows() {
            let attribution = model.attribute(row)?;
            for (total, c) in totals.iter_mut().zip(&attribution.contributions) {
                *total += c.abs();
            }
        }
        let n = batch.nrows().max(1) as f64;
        Ok(totals.into_iter().map(|t| t / n).collect())
    }
}

/// Perturbation step for a feature value: 1% of its magnitude, at least 0.01
pub fn perturbation_step(value: f64) -> f64 {
    (value.abs() * 0.01).max(0.01)
}

/// Model-agnostic proxy
///
/// This is a first-order sensitivity, not an attribution: contributions are
/// probability shifts and do not sum to anything meaningful.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensitivityAttribution {
    /// Seed for the permutation importance shuffles
    pub seed: u64,
}

impl SensitivityAttribution {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl AttributionStrategy for SensitivityAttribution {
    fn method(&self) -> ExplanationMethod {
        ExplanationMethod::Sensitivity
    }

    fn summary_method(&self) -> ExplanationMethod {
        ExplanationMethod::Permutation
    }

    fn explain_row(
        &self,
        model: &dyn Classifier,
        row: ArrayView1<'_, f64>,
    ) -> Result<Vec<f64>, InferenceError> {
        let m = row.len();
        let base = row.to_owned().insert_axis(Axis(0));
        let base_probability = model.predict_proba(base.view())?;

        // one probe row per feature, each nudged along a single column
        let mut probes = Array2::from_shape_fn((m, m), |(_, j)| row[j]);
        for j in 0..m {
            probes[[j, j]] += perturbation_step(row[j]);
        }
        let perturbed = model.predict_proba(probes.view())?;

        Ok(perturbed.iter().map(|p| p - base_probability[0]).collect())
    }

    fn importance(
        &self,
        model: &dyn Classifier,
        batch: ArrayView2<'_, f64>,
    ) -> Result<Vec<f64>, InferenceError> {
        let baseline = model.predict_proba(batch)?;
        let n = batch.nrows().max(1) as f64;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut scores = Vec::with_capacity(batch.ncols());

        for j in 0..batch.ncols() {
            let mut column = batch.column(j).to_vec();
            column.shuffle(&mut rng);
            let mut shuffled = batch.to_owned();
            for (cell, value) in shuffled.column_mut(j).iter_mut().zip(column) {
                *cell = value;
            }
            let perturbed = model.predict_proba(shuffled.view())?;
            let shift: f64 = baseline
                .iter()
                .zip(perturbed.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            scores.push(shift / n);
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::{HeuristicClassifier, LogisticModel, LogisticParams};
    use ndarray::arr1;
    use proptest::prelude::*;

    fn heuristic() -> HeuristicClassifier {
        HeuristicClassifier::for_features(&["torque", "tool_wear", "air_temperature"]).unwrap()
    }

    #[test]
    fn test_zero_value_uses_floor_step() {
        assert_eq!(perturbation_step(0.0), 0.01);
        assert_eq!(perturbation_step(-0.5), 0.01);
        assert!((perturbation_step(300.0) - 3.0).abs() < 1e-12);
        assert!((perturbation_step(-40.0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_sensitivity_of_heuristic() {
        let row = arr1(&[40.0, 120.0, 300.0]);
        let c = SensitivityAttribution::default()
            .explain_row(&heuristic(), row.view())
            .unwrap();
        // torque step 0.4 moves the score by 0.004, wear step 1.2 by 0.0024
        assert!((c[0] - 0.004).abs() < 1e-9);
        assert!((c[1] - 0.0024).abs() < 1e-9);
        assert_eq!(c[2], 0.0);
    }

    #[test]
    fn test_exact_requires_support() {
        let row = arr1(&[40.0, 120.0, 300.0]);
        let err = ExactAttribution.explain_row(&heuristic(), row.view()).unwrap_err();
        assert!(matches!(err, InferenceError::AttributionUnsupported(_)));
    }

    #[test]
    fn test_exact_importance_is_mean_abs() {
        let x = Array2::from_shape_vec((4, 1), vec![-2.0, -1.0, 1.0, 2.0]).unwrap();
        let model = LogisticModel::fit(x.view(), &[false, false, true, true], &LogisticParams::default()).unwrap();
        let importance = ExactAttribution.importance(&model, x.view()).unwrap();
        let expected = x
            .rows()
            .into_iter()
            .map(|r| model.attribute(r).unwrap().contributions[0].abs())
            .sum::<f64>()
            / 4.0;
        assert!((importance[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_permutation_ignores_unused_column() {
        let batch = Array2::from_shape_fn((20, 3), |(i, j)| (i * (j + 1)) as f64);
        let scores = SensitivityAttribution::new(7).importance(&heuristic(), batch.view()).unwrap();
        assert_eq!(scores[2], 0.0);
        assert!(scores.iter().all(|s| *s >= 0.0));
    }

    #[test]
    fn test_permutation_is_seeded() {
        let batch = Array2::from_shape_fn((30, 3), |(i, j)| ((i * 7 + j * 3) % 11) as f64);
        let a = SensitivityAttribution::new(1).importance(&heuristic(), batch.view()).unwrap();
        let b = SensitivityAttribution::new(1).importance(&heuristic(), batch.view()).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn perturbation_step_never_zero(value in -1e6f64..1e6) {
            prop_assert!(perturbation_step(value) >= 0.01);
        }
    }
}
