//! Sensor Data
//!
//! Reading types shared by every stage of the pipeline, a small columnar
//! frame, and CSV loading for the training dataset.

mod frame;
mod loader;
mod preprocess;
mod reading;

pub use frame::{Column, Frame};
pub use loader::{load_dataset, normalize_columns, read_csv, REQUIRED_COLUMNS};
pub use preprocess::{fill_missing_with_median, median};
pub use reading::{LabeledReadings, SensorReading, RAW_COLUMNS, TARGET_COLUMN};

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or reshaping tabular data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Dataset not found at {0}")]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("Columns have no observed values: {0:?}")]
    EmptyColumns(Vec<String>),
    #[error("Column {0} is not numeric")]
    NonNumericColumn(String),
    #[error("Column {name} has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
}
