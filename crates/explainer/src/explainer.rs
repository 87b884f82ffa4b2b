//! Explainer

use crate::contributions::Contributions;
use crate::strategy::{
    AttributionStrategy, ExactAttribution, ExplanationMethod, SensitivityAttribution,
};
use crate::ExplainError;
use feature_engine::FeatureMatrix;
use inference_engine::Classifier;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Explainer configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainerConfig {
    /// Use model-native attribution when the backend supports it
    pub exact_attribution: bool,
    /// Seed for permutation importance
    pub permutation_seed: u64,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            exact_attribution: true,
            permutation_seed: 42,
        }
    }
}

/// Contributions plus how they were computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub method: ExplanationMethod,
    pub contributions: Contributions,
}

/// Strategy chosen once per model
pub struct Explainer {
    strategy: Box<dyn AttributionStrategy>,
    proxy: SensitivityAttribution,
}

impl Explainer {
    /// Pick the exact strategy when the model supports it and it is enabled
    pub fn for_model(model: &dyn Classifier, config: &ExplainerConfig) -> Self {
        let proxy = SensitivityAttribution::new(config.permutation_seed);
        let strategy: Box<dyn AttributionStrategy> =
            if config.exact_attribution && model.supports_attribution() {
                Box::new(ExactAttribution)
            } else {
                Box::new(proxy)
            };
        debug!(
            "Explainer for {} backend uses {} attribution",
            model.backend(),
            strategy.method().as_str()
        );
        Self { strategy, proxy }
    }

    /// Method used for single-row explanations when nothing fails
    pub fn method(&self) -> ExplanationMethod {
        self.strategy.method()
    }

    /// Explain exactly one row
    pub fn explain(
        &self,
        model: &dyn Classifier,
        rows: &FeatureMatrix,
    ) -> Result<Explanation, ExplainError> {
        if rows.n_rows() != 1 {
            return Err(ExplainError::RowCount(rows.n_rows()));
        }
        check_width(model, rows)?;
        let row = rows.values().row(0);

        let (method, values) = match self.strategy.explain_row(model, row) {
            Ok(values) => (self.strategy.method(), values),
            Err(err) => {
                warn!("Exact attribution failed ({}), using sensitivity proxy", err);
                (self.proxy.method(), self.proxy.explain_row(model, row)?)
            }
        };

        Ok(Explanation {
            method,
            contributions: Contributions::new(rows.names(), &values),
        })
    }

    /// Mean importance per feature over a batch; rank with [`Contributions::ranked`]
    pub fn summary(
        &self,
        model: &dyn Classifier,
        batch: &FeatureMatrix,
    ) -> Result<Explanation, ExplainError> {
        if batch.n_rows() == 0 {
            return Err(ExplainError::EmptyBatch);
        }
        check_width(model, batch)?;
        let values = batch.values().view();

        let (method, importance) = match self.strategy.importance(model, values) {
            Ok(importance) => (self.strategy.summary_method(), importance),
            Err(err) => {
                warn!("Exact importance failed ({}), using permutation proxy", err);
                (self.proxy.summary_method(), self.proxy.importance(model, values)?)
            }
        };

        Ok(Explanation {
            method,
            contributions: Contributions::new(batch.names(), &importance),
        })
    }
}

fn check_width(model: &dyn Classifier, matrix: &FeatureMatrix) -> Result<(), ExplainError> {
    if model.n_features() != matrix.n_features() {
        return Err(ExplainError::FeatureCountMismatch {
            expected: model.n_features(),
            actual: matrix.n_features(),
        });
    }
    Ok(())
}
