//! Named Contributions

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One feature's signed contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

/// Contributions in model feature order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contributions {
    entries: Vec<FeatureContribution>,
}

impl Contributions {
    /// Pair names with values; extra entries on either side are dropped
    pub fn new<S: AsRef<str>>(names: &[S], values: &[f64]) -> Self {
        Self {
            entries: names
                .iter()
                .zip(values)
                .map(|(name, &contribution)| FeatureContribution {
                    feature: name.as_ref().to_string(),
                    contribution,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.feature == feature)
            .map(|e| e.contribution)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureContribution> {
        self.entries.iter()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|e| e.contribution).sum()
    }

    /// All entries by |contribution| descending; ties keep feature order
    pub fn ranked(&self) -> Vec<FeatureContribution> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(Ordering::Equal)
        });
        ranked
    }

    /// The `k` largest-magnitude entries
    pub fn top(&self, k: usize) -> Vec<FeatureContribution> {
        let mut ranked = self.ranked();
        ranked.truncate(k);
        ranked
    }
}
