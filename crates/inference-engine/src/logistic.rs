//! Logistic Regression
//!
//! Coefficients come from `linfa-logistic` fitted on standardized columns;
//! the model keeps its own copy of the coefficients and scaling so artifacts
//! stay independent of the fitting crate.

use crate::classifier::{check_training_inputs, check_width, sigmoid, Attribution, Classifier, ModelBackend};
use crate::InferenceError;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticParams {
    pub max_iter: usize,
    /// L2 penalty on the coefficients
    pub l2_penalty: f64,
    /// Gradient norm at which the solver stops
    pub tolerance: f64,
    /// Positive rows are repeated this many times (rounded) before fitting
    pub scale_pos_weight: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iter: 500,
            l2_penalty: 1.0,
            tolerance: 1e-4,
            scale_pos_weight: 1.0,
        }
    }
}

impl LogisticParams {
    fn validate(&self) -> Result<(), InferenceError> {
        if self.max_iter == 0 {
            return Err(InferenceError::InvalidParams("max_iter must be positive".into()));
        }
        if !(self.tolerance > 0.0) {
            return Err(InferenceError::InvalidParams("tolerance must be positive".into()));
        }
        if !(self.scale_pos_weight > 0.0 && self.scale_pos_weight.is_finite()) || !(self.l2_penalty >= 0.0) {
            return Err(InferenceError::InvalidParams(
                "scale_pos_weight must be positive and l2_penalty non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Linear model over standardized inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
    means: Vec<f64>,
    scales: Vec<f64>,
}

fn standardize(x: ArrayView2<'_, f64>) -> (Vec<f64>, Vec<f64>) {
    let n_rows = x.nrows() as f64;
    let means: Vec<f64> = x
        .mean_axis(Axis(0))
        .map(|m| m.to_vec())
        .unwrap_or_else(|| vec![0.0; x.ncols()]);
    let scales = x
        .columns()
        .into_iter()
        .zip(&means)
        .map(|(column, mean)| {
            let sd = (column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_rows).sqrt();
            if sd > 1e-12 {
                sd
            } else {
                1.0
            }
        })
        .collect();
    (means, scales)
}

impl LogisticModel {
    /// Fit on a row-major matrix and boolean failure labels
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[bool],
        params: &LogisticParams,
    ) -> Result<Self, InferenceError> {
        params.validate()?;
        check_training_inputs(x, y)?;

        let (means, scales) = standardize(x);
        let repeats = (params.scale_pos_weight.round() as usize).max(1);
        let rows: Vec<usize> = y
            .iter()
            .enumerate()
            .flat_map(|(i, &label)| std::iter::repeat(i).take(if label { repeats } else { 1 }))
            .collect();

        let z = Array2::from_shape_fn((rows.len(), x.ncols()), |(i, j)| {
            (x[[rows[i], j]] - means[j]) / scales[j]
        });
        let targets: Array1<usize> = rows.iter().map(|&i| usize::from(y[i])).collect();
        let dataset = DatasetBase::from(z).with_targets(targets);

        let fitted = LogisticRegression::default()
            .alpha(params.l2_penalty)
            .max_iterations(params.max_iter as u64)
            .gradient_tolerance(params.tolerance)
            .fit(&dataset)
            .map_err(|err| InferenceError::FitFailed(err.to_string()))?;

        // linfa picks its own positive class; align it with the failure label
        let probabilities = fitted.predict_probabilities(dataset.records());
        let predicted: Array1<usize> = fitted.predict(dataset.records());
        let failure_is_positive = probabilities
            .iter()
            .zip(predicted.iter())
            .find(|(p, _)| **p != 0.5)
            .map_or(true, |(p, &label)| (label == 1) == (*p > 0.5));
        let sign = if failure_is_positive { 1.0 } else { -1.0 };
        debug!("linfa positive class is failure: {}", failure_is_positive);

        info!(
            "Fitted logistic regression on {} rows x {} features ({} after class weighting)",
            x.nrows(),
            x.ncols(),
            rows.len()
        );

        Ok(Self {
            weights: fitted.params().iter().map(|w| sign * w).collect(),
            intercept: sign * fitted.intercept(),
            means,
            scales,
        })
    }

    /// Coefficients on the standardized scale
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn contributions(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        row.iter()
            .zip(&self.weights)
            .zip(self.means.iter().zip(&self.scales))
            .map(|((v, w), (mean, scale))| w * (v - mean) / scale)
            .collect()
    }

    /// Raw log-odds for one row
    pub fn margin(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.intercept + self.contributions(row).iter().sum::<f64>()
    }
}

impl Classifier for LogisticModel {
    fn backend(&self) -> ModelBackend {
        ModelBackend::LogisticRegression
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        check_width(self.weights.len(), rows.ncols())?;
        Ok(rows
            .rows()
            .into_iter()
            .map(|row| sigmoid(self.margin(row)))
            .collect())
    }

    fn supports_attribution(&self) -> bool {
        true
    }

    // Linear in standardized space, so contributions relative to the
    // training mean are exact.
    fn attribute(&self, row: ArrayView1<'_, f64>) -> Result<Attribution, InferenceError> {
        check_width(self.weights.len(), row.len())?;
        Ok(Attribution {
            baseline: self.intercept,
            contributions: self.contributions(row),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> (Array2<f64>, Vec<bool>) {
        let n = 80;
        let mut flat = Vec::with_capacity(n * 2);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let signal = i as f64 / 8.0 - 5.0;
            let noise = ((i * 37) % 11) as f64;
            flat.extend_from_slice(&[signal, noise]);
            y.push(signal > 0.0);
        }
        (Array2::from_shape_vec((n, 2), flat).unwrap(), y)
    }

    #[test]
    fn test_orders_rows_by_signal() {
        let (x, y) = dataset();
        let model = LogisticModel::fit(x.view(), &y, &LogisticParams::default()).unwrap();

        let probe = Array2::from_shape_vec((2, 2), vec![-4.0, 5.0, 4.0, 5.0]).unwrap();
        let proba = model.predict_proba(probe.view()).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
        assert!(model.weights()[0] > 0.0);
    }

    #[test]
    fn test_attribution_is_exact() {
        let (x, y) = dataset();
        let model = LogisticModel::fit(x.view(), &y, &LogisticParams::default()).unwrap();

        for i in [0, 20, 40, 79] {
            let attribution = model.attribute(x.row(i)).unwrap();
            assert!((attribution.margin() - model.margin(x.row(i))).abs() < 1e-12);
            assert_eq!(attribution.baseline, model.intercept());
        }
    }

    #[test]
    fn test_constant_column_is_harmless() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 3.0, 2.0, 3.0, 3.0, 3.0, 4.0, 3.0]).unwrap();
        let y = [false, false, true, true];
        let model = LogisticModel::fit(x.view(), &y, &LogisticParams::default()).unwrap();
        let proba = model.predict_proba(x.view()).unwrap();
        assert!(proba.iter().all(|p| p.is_finite()));
        assert!(proba[3] > proba[0]);
    }

    #[test]
    fn test_positive_weight_shifts_scores_up() {
        let (x, y) = dataset();
        let plain = LogisticModel::fit(x.view(), &y, &LogisticParams::default()).unwrap();
        let weighted = LogisticModel::fit(
            x.view(),
            &y,
            &LogisticParams {
                scale_pos_weight: 5.0,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(weighted.margin(x.row(40)) > plain.margin(x.row(40)));
    }

    #[test]
    fn test_rejects_bad_params() {
        let (x, y) = dataset();
        let params = LogisticParams {
            max_iter: 0,
            ..Default::default()
        };
        assert!(matches!(
            LogisticModel::fit(x.view(), &y, &params),
            Err(InferenceError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_labels() {
        let (x, _) = dataset();
        let err = LogisticModel::fit(x.view(), &[true, false], &LogisticParams::default()).unwrap_err();
        assert_eq!(err, InferenceError::LabelMismatch { rows: 80, labels: 2 });
    }
}
