//! Sensor Reading Types

use crate::frame::{Column, Frame};
use crate::DataError;
use serde::{Deserialize, Serialize};

/// Raw sensor columns in canonical order
pub const RAW_COLUMNS: [&str; 5] = [
    "air_temperature",
    "process_temperature",
    "rotational_speed",
    "torque",
    "tool_wear",
];

/// Binary failure label column
pub const TARGET_COLUMN: &str = "failure";

/// One sensor reading from a monitored machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Ambient air temperature (K)
    pub air_temperature: f64,
    /// Process temperature (K)
    pub process_temperature: f64,
    /// Spindle speed (rpm)
    pub rotational_speed: f64,
    /// Torque (Nm)
    pub torque: f64,
    /// Accumulated tool wear (min)
    pub tool_wear: f64,
}

impl SensorReading {
    /// Look up a raw field by its canonical column name
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "air_temperature" => Some(self.air_temperature),
            "process_temperature" => Some(self.process_temperature),
            "rotational_speed" => Some(self.rotational_speed),
            "torque" => Some(self.torque),
            "tool_wear" => Some(self.tool_wear),
            _ => None,
        }
    }

    /// Raw values in `RAW_COLUMNS` order
    pub fn values(&self) -> [f64; 5] {
        [
            self.air_temperature,
            self.process_temperature,
            self.rotational_speed,
            self.torque,
            self.tool_wear,
        ]
    }
}

/// Time-ordered readings paired with their failure labels
#[derive(Debug, Clone, Default)]
pub struct LabeledReadings {
    pub readings: Vec<SensorReading>,
    pub failures: Vec<bool>,
}

impl LabeledReadings {
    /// Convert a frame holding the required columns into readings and labels
    pub fn from_frame(frame: &Frame) -> Result<Self, DataError> {
        let missing: Vec<String> = RAW_COLUMNS
            .iter()
            .chain(std::iter::once(&TARGET_COLUMN))
            .filter(|name| frame.column(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }
        let empty = frame.unobserved_columns();
        if !empty.is_empty() {
            return Err(DataError::EmptyColumns(empty));
        }

        let air = numeric(frame, "air_temperature")?;
        let process = numeric(frame, "process_temperature")?;
        let speed = numeric(frame, "rotational_speed")?;
        let torque = numeric(frame, "torque")?;
        let wear = numeric(frame, "tool_wear")?;
        let target = numeric(frame, TARGET_COLUMN)?;

        let readings = (0..frame.n_rows())
            .map(|i| SensorReading {
                air_temperature: air[i],
                process_temperature: process[i],
                rotational_speed: speed[i],
                torque: torque[i],
                tool_wear: wear[i],
            })
            .collect();
        let failures = target.iter().map(|&v| v != 0.0).collect();

        Ok(Self { readings, failures })
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of failure rows
    pub fn positives(&self) -> usize {
        self.failures.iter().filter(|&&f| f).count()
    }
}

fn numeric<'a>(frame: &'a Frame, name: &str) -> Result<&'a [f64], DataError> {
    match frame.column(name) {
        Some(Column::Numeric(values)) => Ok(values.as_slice()),
        _ => Err(DataError::NonNumericColumn(name.to_string())),
    }
}
