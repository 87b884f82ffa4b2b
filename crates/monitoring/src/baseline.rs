//! Monitoring Baseline

use feature_engine::SummaryStatistics;
use sensor_data::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Reference statistics of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBaseline {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub p95: f64,
}

/// Column name to baseline statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoringBaseline {
    columns: BTreeMap<String, ColumnBaseline>,
}

impl MonitoringBaseline {
    pub fn get(&self, column: &str) -> Option<&ColumnBaseline> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnBaseline)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Mean, population std and 95th percentile of every numeric column
///
/// Missing values are ignored; columns with no observed value are omitted.
pub fn build_monitoring_baseline(frame: &Frame) -> MonitoringBaseline {
    let columns = frame
        .iter()
        .filter_map(|(name, column)| {
            let observed: Vec<f64> = column
                .as_numeric()?
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            if observed.is_empty() {
                debug!("Baseline skips empty column {}", name);
                return None;
            }
            let stats = SummaryStatistics::compute(&observed);
            Some((
                name.to_string(),
                ColumnBaseline {
                    mean: stats.mean,
                    std: stats.std_dev,
                    p95: stats.p95,
                },
            ))
        })
        .collect();

    MonitoringBaseline { columns }
}
