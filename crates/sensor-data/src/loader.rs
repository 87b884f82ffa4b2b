//! CSV Dataset Loading

use crate::frame::{Column, Frame};
use crate::reading::{RAW_COLUMNS, TARGET_COLUMN};
use crate::DataError;
use std::path::Path;
use tracing::{debug, info};

/// Columns a training dataset must provide after header normalization
pub const REQUIRED_COLUMNS: [&str; 6] = [
    RAW_COLUMNS[0],
    RAW_COLUMNS[1],
    RAW_COLUMNS[2],
    RAW_COLUMNS[3],
    RAW_COLUMNS[4],
    TARGET_COLUMN,
];

/// Industrial dataset headers (with bracketed units) and their canonical names
const SOURCE_HEADERS: [(&str, &str); 6] = [
    ("Air temperature [K]", "air_temperature"),
    ("Process temperature [K]", "process_temperature"),
    ("Rotational speed [rpm]", "rotational_speed"),
    ("Torque [Nm]", "torque"),
    ("Tool wear [min]", "tool_wear"),
    ("Machine failure", "failure"),
];

/// Rename known source headers to canonical snake_case names
pub fn normalize_columns(frame: &mut Frame) {
    frame.rename(&SOURCE_HEADERS);
}

/// Read a CSV file into a frame, inferring numeric vs. text columns
///
/// A column is numeric when every non-empty cell parses as `f64`; empty cells
/// in a numeric column become NaN.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Frame, DataError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let mut frame = Frame::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        frame.push_column(name, infer_column(raw))?;
    }

    debug!(
        "Read {} rows x {} columns from {}",
        frame.n_rows(),
        frame.n_columns(),
        path.display()
    );
    Ok(frame)
}

fn infer_column(raw: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = raw
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();

    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Text(raw),
    }
}

/// Load a training dataset: read, normalize headers, keep required columns
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Frame, DataError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let mut frame = read_csv(path)?;
    normalize_columns(&mut frame);
    let frame = frame.select(&REQUIRED_COLUMNS)?;
    let empty = frame.unobserved_columns();
    if !empty.is_empty() {
        return Err(DataError::EmptyColumns(empty));
    }

    info!("Loaded dataset {} ({} rows)", path.display(), frame.n_rows());
    Ok(frame)
}
