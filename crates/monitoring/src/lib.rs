//! Model Monitoring
//!
//! Two-sample Kolmogorov-Smirnov drift checks between a reference and a
//! current dataset, summary statistics over served probabilities, and the
//! per-column baseline recorded at training time, plus the logging setup
//! shared by the binaries.

mod baseline;
mod drift;
mod logging;
mod performance;

pub use baseline::{build_monitoring_baseline, ColumnBaseline, MonitoringBaseline};
pub use drift::{
    ks_two_sample, DriftDetector, DriftReport, DriftResult, KsTest, DEFAULT_ALPHA,
    EXACT_SIZE_LIMIT,
};
pub use logging::{init_logging, LoggingConfig};
pub use performance::{
    summarize_predictions, PredictionMonitor, PredictionStats, DEFAULT_HIGH_RISK_THRESHOLD,
};
