//! Classifier Backend Resolution
//!
//! Backends are tried in the configured order; the first one that is both
//! known and compiled in trains the model. The chosen tag is stored in the
//! artifact.

use crate::settings::TrainingConfig;
use crate::TrainingError;
use inference_engine::{
    GradientBoostingParams, InferenceError, LogisticModel, LogisticParams,
    ModelBackend, TrainedModel,
};
use ndarray::ArrayView2;
use tracing::{info, warn};

/// A trainable classifier backend
pub trait ModelBuilder: Send + Sync {
    fn backend(&self) -> ModelBackend;

    /// `Err(reason)` when the backend cannot be used in this build
    fn available(&self) -> Result<(), String> {
        Ok(())
    }

    fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[bool],
        scale_pos_weight: f64,
    ) -> Result<TrainedModel, InferenceError>;
}

/// Gradient-boosted trees, gated by the `gradient-boosting` cargo feature
pub struct GradientBoostingBuilder {
    params: GradientBoostingParams,
}

impl GradientBoostingBuilder {
    /// Create a new builder seeded with `random_state`
    pub fn new(params: GradientBoostingParams, random_state: u64) -> Self {
        Self {
            params: GradientBoostingParams {
                random_state,
                ..params
            },
        }
    }
}

impl ModelBuilder for GradientBoostingBuilder {
    fn backend(&self) -> ModelBackend {
        ModelBackend::GradientBoosting
    }

    fn available(&self) -> Result<(), String> {
        if cfg!(feature = "gradient-boosting") {
            Ok(())
        } else {
            Err("built without the gradient-boosting feature".into())
        }
    }

    #[cfg(feature = "gradient-boosting")]
    fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[bool],
        scale_pos_weight: f64,
    ) -> Result<TrainedModel, InferenceError> {
        let params = GradientBoostingParams {
            scale_pos_weight,
            ..self.params.clone()
        };
        inference_engine::GradientBoostedTrees::fit(x, y, &params).map(TrainedModel::GradientBoosting)
    }

    #[cfg(not(feature = "gradient-boosting"))]
    fn fit(
        &self,
        _x: ArrayView2<'_, f64>,
        _y: &[bool],
        _scale_pos_weight: f64,
    ) -> Result<TrainedModel, InferenceError> {
        Err(InferenceError::FitFailed(
            "built without the gradient-boosting feature".into(),
        ))
    }
}

pub struct LogisticRegressionBuilder {
    params: LogisticParams,
}

impl LogisticRegressionBuilder {
    pub fn new(params: LogisticParams) -> Self {
        Self { params }
    }
}

impl ModelBuilder for LogisticRegressionBuilder {
    fn backend(&self) -> ModelBackend {
        ModelBackend::LogisticRegression
    }

    fn fit(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[bool],
        scale_pos_weight: f64,
    ) -> Result<TrainedModel, InferenceError> {
        let params = LogisticParams {
            scale_pos_weight,
            ..self.params.clone()
        };
        LogisticModel::fit(x, y, &params).map(TrainedModel::LogisticRegression)
    }
}

/// Builder for a configured backend name; `None` for unknown or untrainable names
pub fn builder_for(name: &str, config: &TrainingConfig) -> Option<Box<dyn ModelBuilder>> {
    match ModelBackend::from_name(name)? {
        ModelBackend::GradientBoosting => Some(Box::new(GradientBoostingBuilder::new(
            config.gradient_boosting.clone(),
            config.random_state,
        ))),
        ModelBackend::LogisticRegression => Some(Box::new(LogisticRegressionBuilder::new(
            config.logistic_regression.clone(),
        ))),
        ModelBackend::Heuristic => None,
    }
}

/// First usable backend in `config.backends`
pub fn resolve_builder(config: &TrainingConfig) -> Result<Box<dyn ModelBuilder>, TrainingError> {
    let mut skipped = Vec::new();

    for name in &config.backends {
        let Some(builder) = builder_for(name, config) else {
            warn!("Skipping backend {}: not a trainable backend", name);
            skipped.push(name.clone());
            continue;
        };
        match builder.available() {
            Ok(()) => {
                info!("Using backend {}", builder.backend());
                return Ok(builder);
            }
            Err(reason) => {
                warn!("Skipping backend {}: {}", name, reason);
                skipped.push(name.clone());
            }
        }
    }

    Err(TrainingError::NoBackendAvailable(skipped))
}
