//! Predictive Maintenance Server - Main Entry Point

use anyhow::Context;
use api::{install_recorder, run_server, AppState, ServeConfig};
use clap::Parser;
use monitoring::init_logging;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Serve failure-risk predictions over HTTP
#[derive(Debug, Parser)]
#[command(name = "pdm-serve", version, about)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "PDM_CONFIG")]
    config: Option<PathBuf>,

    /// Model artifact to serve
    #[arg(long)]
    model_path: Option<PathBuf>,

    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServeConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.model_path {
        config.model_path = path;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    init_logging(&config.logging);
    info!("=== Predictive Maintenance Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model_path.display());

    let mut state = AppState::new(&config);
    if config.metrics_enabled {
        state = state.with_metrics(install_recorder()?);
    }

    let addr = config.socket_addr()?;
    run_server(Arc::new(state), addr).await?;

    Ok(())
}
