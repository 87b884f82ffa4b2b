//! Sensor Reading Validation
//!
//! Rejects malformed readings at the request boundary so the scoring core can
//! assume valid ranges.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Bound, ValidationConfig, ValidationResult, Validator};
