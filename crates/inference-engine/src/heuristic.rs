//! Heuristic Classifier
//!
//! Adapts the deterministic torque/tool-wear rule to the [`Classifier`] trait
//! so it can be scored in batch and explained by sensitivity analysis.

use crate::classifier::{check_width, Classifier, ModelBackend};
use crate::InferenceError;
use fallback::FallbackScorer;
use ndarray::{Array1, ArrayView2};

/// Fallback rule bound to a column layout
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    torque_index: usize,
    tool_wear_index: usize,
    n_features: usize,
    scorer: FallbackScorer,
}

impl HeuristicClassifier {
    /// Locate `torque` and `tool_wear` among the column names
    pub fn for_features<S: AsRef<str>>(names: &[S]) -> Result<Self, InferenceError> {
        let position = |wanted: &str| {
            names
                .iter()
                .position(|n| n.as_ref() == wanted)
                .ok_or_else(|| InferenceError::UnknownFeature(wanted.to_string()))
        };
        Ok(Self {
            torque_index: position("torque")?,
            tool_wear_index: position("tool_wear")?,
            n_features: names.len(),
            scorer: FallbackScorer::new(),
        })
    }
}

impl Classifier for HeuristicClassifier {
    fn backend(&self) -> ModelBackend {
        ModelBackend::Heuristic
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        check_width(self.n_features, rows.ncols())?;
        Ok(rows
            .rows()
            .into_iter()
            .map(|row| {
                self.scorer
                    .score(row[self.torque_index], row[self.tool_wear_index])
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_COLUMNS;
    use ndarray::Array2;

    #[test]
    fn test_scores_like_fallback_rule() {
        let clf = HeuristicClassifier::for_features(&FEATURE_COLUMNS).unwrap();
        let mut row = Array2::<f64>::zeros((1, FEATURE_COLUMNS.len()));
        row[[0, 3]] = 40.0;
        row[[0, 4]] = 120.0;
        let proba = clf.predict_proba(row.view()).unwrap();
        assert!((proba[0] - 0.64).abs() < 1e-12);
        assert!(!clf.supports_attribution());
    }

    #[test]
    fn test_requires_torque_and_wear() {
        let err = HeuristicClassifier::for_features(&["torque", "air_temperature"]).unwrap_err();
        assert_eq!(err, InferenceError::UnknownFeature("tool_wear".into()));
    }

    #[test]
    fn test_attribution_unsupported() {
        let clf = HeuristicClassifier::for_features(&["tool_wear", "torque"]).unwrap();
        let row = ndarray::arr1(&[10.0, 20.0]);
        assert_eq!(
            clf.attribute(row.view()).unwrap_err(),
            InferenceError::AttributionUnsupported(ModelBackend::Heuristic)
        );
    }
}
