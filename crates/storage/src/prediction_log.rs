//! Prediction Log

use crate::StorageError;
use chrono::{DateTime, Utc};
use risk_bucketer::RiskLevel;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

/// Records kept when no capacity is configured
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// One served prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub failure_probability: f64,
    pub risk_level: RiskLevel,
    pub used_fallback: bool,
}

struct LogState {
    records: VecDeque<PredictionRecord>,
    next_id: u64,
}

/// Bounded in-memory log; the oldest record is evicted first
pub struct PredictionLog {
    state: Mutex<LogState>,
    capacity: usize,
}

impl PredictionLog {
    /// Create a new log holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(LogState {
                records: VecDeque::with_capacity(capacity.min(1024)),
                next_id: 1,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a prediction and return its id
    pub fn record(
        &self,
        failure_probability: f64,
        risk_level: RiskLevel,
        used_fallback: bool,
    ) -> Result<u64, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let id = state.next_id;
        state.next_id += 1;

        // Enforce retention
        while state.records.len() >= self.capacity {
            state.records.pop_front();
        }
        state.records.push_back(PredictionRecord {
            id,
            timestamp: Utc::now(),
            failure_probability,
            risk_level,
            used_fallback,
        });
        debug!("Logged prediction {} (p={:.4})", id, failure_probability);
        Ok(id)
    }

    /// Most recent records first
    pub fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, StorageError> {
        let state = self
            .state
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(state.records.iter().rev().take(limit).cloned().collect())
    }

    /// Probabilities of every retained record, oldest first
    pub fn probabilities(&self) -> Result<Vec<f64>, StorageError> {
        let state = self
            .state
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(state.records.iter().map(|r| r.failure_probability).collect())
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all records (for testing)
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.records.clear();
        }
    }
}

impl Default for PredictionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
