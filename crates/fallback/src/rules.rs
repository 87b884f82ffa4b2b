//! Heuristic Failure Score

use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Torque (Nm) that alone saturates the score
pub const TORQUE_SCALE: f64 = 100.0;

/// Tool wear (min) that alone saturates the score
pub const WEAR_SCALE: f64 = 500.0;

/// Monotonic heuristic: `clamp(torque / 100 + tool_wear / 500, 0, 1)`
///
/// Callers rely on this exact formula when no model is available, so the
/// constants are not configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackScorer;

impl FallbackScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score raw torque and tool wear
    pub fn score(&self, torque: f64, tool_wear: f64) -> f64 {
        (torque / TORQUE_SCALE + tool_wear / WEAR_SCALE).clamp(0.0, 1.0)
    }

    /// Score a feature vector
    pub fn score_features(&self, features: &FeatureVector) -> f64 {
        let score = self.score(features.torque, features.tool_wear);
        debug!("Fallback score {:.4} (torque={}, tool_wear={})", score, features.torque, features.tool_wear);
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FeatureBuilder;
    use proptest::prelude::*;
    use sensor_data::SensorReading;

    #[test]
    fn test_saturates_at_one() {
        assert_eq!(FallbackScorer.score(100.0, 0.0), 1.0);
        assert_eq!(FallbackScorer.score(90.0, 400.0), 1.0);
    }

    #[test]
    fn test_zero_inputs() {
        assert_eq!(FallbackScorer.score(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_reference_reading() {
        let fv = FeatureBuilder::new().build_one(&SensorReading {
            air_temperature: 300.0,
            process_temperature: 310.0,
            rotational_speed: 1500.0,
            torque: 40.0,
            tool_wear: 120.0,
        });
        let score = FallbackScorer.score_features(&fv);
        assert!((score - 0.64).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn score_is_clamped(torque in -1e4f64..1e4, wear in -1e4f64..1e4) {
            let s = FallbackScorer.score(torque, wear);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn score_is_monotonic_in_torque(torque in 0.0f64..200.0, bump in 0.0f64..50.0, wear in 0.0f64..300.0) {
            prop_assert!(FallbackScorer.score(torque + bump, wear) >= FallbackScorer.score(torque, wear));
        }
    }
}
