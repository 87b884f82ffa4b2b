//! Rule-Based Fallback Scoring
//!
//! Provides a deterministic failure score when no trained model is loaded.

mod rules;

pub use rules::{FallbackScorer, TORQUE_SCALE, WEAR_SCALE};
