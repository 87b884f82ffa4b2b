//! Serving Configuration

use crate::ApiError;
use data_validator::ValidationConfig;
use explainer::ExplainerConfig;
use monitoring::LoggingConfig;
use risk_bucketer::RiskThresholds;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Environment variable prefix, e.g. `PDM_SERVE__RISK__HIGH=0.8`
const ENV_PREFIX: &str = "PDM_SERVE";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Artifact written by `pdm-train`; may not exist yet
    pub model_path: PathBuf,
    /// Number of contributors returned with an explanation
    pub top_k: usize,
    /// Served predictions kept for `/monitoring/predictions`
    pub prediction_log_capacity: usize,
    /// Install the Prometheus recorder and serve `/metrics`
    #[serde(default)]
    pub metrics_enabled: bool,
    #[serde(default)]
    pub risk: RiskThresholds,
    #[serde(default)]
    pub explainer: ExplainerConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServeConfig {
    /// Embedded defaults, then the optional file, then `PDM_SERVE__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, ApiError> {
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
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded defaults only
    pub fn defaults() -> Result<Self, ApiError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        self.risk.validate()?;
        if self.top_k == 0 {
            return Err(ApiError::InvalidConfig("top_k must be at least 1".into()));
        }
        Ok(())
    }

    /// Listen address from `host` and `port`
    pub fn socket_addr(&self) -> Result<SocketAddr, ApiError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ApiError::InvalidConfig(format!("invalid listen address: {e}")))
    }
}
