//! Training Configuration

use crate::TrainingError;
use inference_engine::{GradientBoostingParams, LogisticParams};
use monitoring::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Environment variable prefix, e.g. `PDM_TRAIN__RANDOM_STATE=7`
const ENV_PREFIX: &str = "PDM_TRAIN";

/// Misclassification costs for `expected_cost`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub false_negative: f64,
    pub false_positive: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            false_negative: 10.0,
            false_positive: 1.0,
        }
    }
}

/// Training job configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Labelled CSV dataset
    pub data_path: PathBuf,
    /// Artifact output
    pub model_path: PathBuf,
    /// Optional JSON file for the monitoring baseline
    #[serde(default)]
    pub baseline_path: Option<PathBuf>,
    pub random_state: u64,
    /// Fraction of each class held out for evaluation
    pub test_size: f64,
    /// Probability at or above which a holdout row is predicted positive
    pub decision_threshold: f64,
    pub high_risk_threshold: f64,
    /// Maximum holdout rows used for the feature-importance summary
    pub importance_sample_size: usize,
    /// Backend names in order of preference
    pub backends: Vec<String>,
    #[serde(default)]
    pub cost: CostWeights,
    #[serde(default)]
    pub gradient_boosting: GradientBoostingParams,
    #[serde(default)]
    pub logistic_regression: LogisticParams,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrainingConfig {
    /// Embedded defaults, then the optional file, then `PDM_TRAIN__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, TrainingError> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ));
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("backends")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded defaults only
    pub fn defaults() -> Result<Self, TrainingError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "test_size must lie in (0, 1), got {}",
                self.test_size
            )));
        }
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Err(TrainingError::InvalidConfig(format!(
                "decision_threshold must lie in [0, 1], got {}",
                self.decision_threshold
            )));
        }
        if self.backends.is_empty() {
            return Err(TrainingError::InvalidConfig(
                "at least one backend must be listed".into(),
            ));
        }
        Ok(())
    }
}
