//! Feature Vector Assembly

use crate::statistics::{lag_backfill, rolling_mean};
use sensor_data::SensorReading;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 10;

/// Trailing window (rows) for the torque rolling mean
pub const ROLL_WINDOW: usize = 5;

/// Feature names in the order the classifier is trained on
pub const FEATURE_COLUMNS: [&str; FEATURE_DIMENSION] = [
    "air_temperature",
    "process_temperature",
    "rotational_speed",
    "torque",
    "tool_wear",
    "temp_diff",
    "wear_rate",
    "torque_temp_interaction",
    "torque_roll_mean_5",
    "torque_lag_1",
];

/// Raw readings plus derived features for one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
    /// Process minus air temperature
    pub temp_diff: f64,
    /// Tool wear per (|speed| + 1)
    pub wear_rate: f64,
    /// Torque times process temperature
    pub torque_temp_interaction: f64,
    /// Mean torque over the trailing window
    pub torque_roll_mean_5: f64,
    /// Previous row's torque (back-filled on the first row)
    pub torque_lag_1: f64,
}

impl FeatureVector {
    /// Values in `FEATURE_COLUMNS` order
    pub fn values(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.air_temperature,
            self.process_temperature,
            self.rotational_speed,
            self.torque,
            self.tool_wear,
            self.temp_diff,
            self.wear_rate,
            self.torque_temp_interaction,
            self.torque_roll_mean_5,
            self.torque_lag_1,
        ]
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|&c| c == name)
            .map(|i| self.values()[i])
    }

    /// `(name, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_COLUMNS.into_iter().zip(self.values())
    }
}

/// Stateless builder turning readings into feature vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build one feature vector per reading; readings must be time-ordered
    pub fn build(&self, readings: &[SensorReading]) -> Vec<FeatureVector> {
        let torque: Vec<f64> = readings.iter().map(|r| r.torque).collect();
        let roll_mean = rolling_mean(&torque, ROLL_WINDOW);
        let lag = lag_backfill(&torque);

        debug!("Building features for {} readings", readings.len());

        readings
            .iter()
            .zip(roll_mean)
            .zip(lag)
            .map(|((r, roll), lag)| FeatureVector {
                air_temperature: r.air_temperature,
                process_temperature: r.process_temperature,
                rotational_speed: r.rotational_speed,
                torque: r.torque,
                tool_wear: r.tool_wear,
                temp_diff: r.process_temperature - r.air_temperature,
                wear_rate: r.tool_wear / (r.rotational_speed.abs() + 1.0),
                torque_temp_interaction: r.torque * r.process_temperature,
                torque_roll_mean_5: roll,
                torque_lag_1: lag,
            })
            .collect()
    }

    /// Build the features of a single reading with no prior history
    pub fn build_one(&self, reading: &SensorReading) -> FeatureVector {
        let torque = reading.torque;
        FeatureVector {
            air_temperature: reading.air_temperature,
            process_temperature: reading.process_temperature,
            rotational_speed: reading.rotational_speed,
            torque,
            tool_wear: reading.tool_wear,
            temp_diff: reading.process_temperature - reading.air_temperature,
            wear_rate: reading.tool_wear / (reading.rotational_speed.abs() + 1.0),
            torque_temp_interaction: torque * reading.process_temperature,
            torque_roll_mean_5: torque,
            torque_lag_1: torque,
        }
    }
}
