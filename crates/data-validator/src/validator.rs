//! Reading Validator

use crate::error::ValidationError;
use sensor_data::SensorReading;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lower bound applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `value > 0`
    Positive,
    /// `value >= 0`
    NonNegative,
}

/// Lower bounds per field, fixed by the reading schema
const FIELD_BOUNDS: [(&str, Bound); 5] = [
    ("air_temperature", Bound::Positive),
    ("process_temperature", Bound::Positive),
    ("rotational_speed", Bound::Positive),
    ("torque", Bound::Positive),
    ("tool_wear", Bound::NonNegative),
];

/// Optional plausibility caps; lower bounds are not configurable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Air temperature cap (K)
    pub air_temperature_max: Option<f64>,
    /// Process temperature cap (K)
    pub process_temperature_max: Option<f64>,
    /// Rotational speed cap (rpm)
    pub rotational_speed_max: Option<f64>,
    /// Torque cap (Nm)
    pub torque_max: Option<f64>,
    /// Tool wear cap (min)
    pub tool_wear_max: Option<f64>,
}

impl ValidationConfig {
    fn max_for(&self, field: &str) -> Option<f64> {
        match field {
            "air_temperature" => self.air_temperature_max,
            "process_temperature" => self.process_temperature_max,
            "rotational_speed" => self.rotational_speed_max,
            "torque" => self.torque_max,
            "tool_wear" => self.tool_wear_max,
            _ => None,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Convert into `Result`, keeping every field error
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validator for incoming sensor readings
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against its bound and optional cap
    pub fn validate_field(
        &self,
        field: &'static str,
        value: f64,
        bound: Bound,
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        match bound {
            Bound::Positive if value <= 0.0 => {
                return Err(ValidationError::NotPositive { field, value });
            }
            Bound::NonNegative if value < 0.0 => {
                return Err(ValidationError::Negative { field, value });
            }
            _ => {}
        }
        if let Some(max) = self.config.max_for(field) {
            if value > max {
                return Err(ValidationError::AboveMaximum { field, value, max });
            }
        }
        Ok(())
    }

    /// Check every field of a reading, collecting all failures
    pub fn check(&self, reading: &SensorReading) -> ValidationResult {
        let errors: Vec<ValidationError> = FIELD_BOUNDS
            .iter()
            .filter_map(|&(field, bound)| {
                let value = reading.get(field)?;
                self.validate_field(field, value, bound).err()
            })
            .collect();

        if errors.is_empty() {
            ValidationResult::valid(FIELD_BOUNDS.len())
        } else {
            debug!("Rejected reading: {} invalid field(s)", errors.len());
            ValidationResult::invalid(errors, FIELD_BOUNDS.len())
        }
    }
}
