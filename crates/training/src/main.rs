//! Predictive Maintenance Training - Main Entry Point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use monitoring::init_logging;
use training::{train, TrainingConfig};

/// Train the failure-risk model and write its artifact
#[derive(Debug, Parser)]
#[command(name = "pdm-train", version, about)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "PDM_CONFIG")]
    config: Option<PathBuf>,

    /// Labelled CSV dataset
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Artifact output path
    #[arg(long)]
    model_path: Option<PathBuf>,

    #[arg(long)]
    random_state: Option<u64>,

    /// Also write the monitoring baseline as JSON
    #[arg(long)]
    baseline_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = TrainingConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.data_path {
        config.data_path = path;
    }
    if let Some(path) = cli.model_path {
        config.model_path = path;
    }
    if let Some(seed) = cli.random_state {
        config.random_state = seed;
    }
    if let Some(path) = cli.baseline_path {
        config.baseline_path = Some(path);
    }

    init_logging(&config.logging);
    info!("=== Predictive Maintenance Training v{} ===", env!("CARGO_PKG_VERSION"));

    let report = train(&config)
        .with_context(|| format!("training on {}", config.data_path.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
