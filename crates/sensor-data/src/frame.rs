//! Columnar Frame

use crate::DataError;

/// A single named column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric values; missing cells are NaN
    Numeric(Vec<f64>),
    /// Anything that did not parse as a number
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view, if this is a numeric column
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Text(_) => None,
        }
    }
}

/// Ordered collection of equally long named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; its length must match the existing rows
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), DataError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(DataError::DuplicateColumn(name));
        }
        if let Some((_, first)) = self.columns.first() {
            if first.len() != column.len() {
                return Err(DataError::LengthMismatch {
                    name,
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Numeric column by name (None for text or absent columns)
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, column)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut().map(|(_, c)| c)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Rename columns; pairs are `(from, to)` and absent sources are ignored
    pub fn rename(&mut self, mapping: &[(&str, &str)]) {
        for (name, _) in self.columns.iter_mut() {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| from == name) {
                *name = to.to_string();
            }
        }
    }

    /// New frame with exactly the named columns, in the given order
    pub fn select(&self, names: &[&str]) -> Result<Frame, DataError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| self.column(n).is_none())
            .map(|n| n.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns(missing));
        }

        let columns = names
            .iter()
            .filter_map(|n| self.column(n).map(|c| (n.to_string(), c.clone())))
            .collect();
        Ok(Frame { columns })
    }

    /// Names of non-empty numeric columns in which every cell is missing
    pub fn unobserved_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, c)| match c {
                Column::Numeric(values) => !values.is_empty() && values.iter().all(|v| v.is_nan()),
                Column::Text(_) => false,
            })
            .map(|(n, _)| n.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejects_length_mismatch() {
        let mut frame = Frame::new();
        frame.push_column("a", Column::Numeric(vec![1.0, 2.0])).unwrap();
        let err = frame.push_column("b", Column::Numeric(vec![1.0])).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_select_and_rename() {
        let mut frame = Frame::new();
        frame.push_column("Torque [Nm]", Column::Numeric(vec![40.0])).unwrap();
        frame.push_column("Type", Column::Text(vec!["M".into()])).unwrap();
        frame.rename(&[("Torque [Nm]", "torque"), ("Unknown", "x")]);

        let selected = frame.select(&["torque"]).unwrap();
        assert_eq!(selected.n_columns(), 1);
        assert_eq!(selected.numeric("torque"), Some(&[40.0][..]));

        let err = frame.select(&["torque", "tool_wear"]).unwrap_err();
        assert!(matches!(err, DataError::MissingColumns(m) if m == vec!["tool_wear".to_string()]));
    }

    #[test]
    fn test_unobserved_columns() {
        let mut frame = Frame::new();
        frame.push_column("torque", Column::Numeric(vec![f64::NAN, 40.0])).unwrap();
        frame.push_column("tool_wear", Column::Numeric(vec![f64::NAN, f64::NAN])).unwrap();
        frame.push_column("Type", Column::Text(vec![String::new(), String::new()])).unwrap();
        assert_eq!(frame.unobserved_columns(), vec!["tool_wear".to_string()]);
        assert!(Frame::new().unobserved_columns().is_empty());
    }

    #[test]
    fn test_numeric_view_skips_text() {
        let mut frame = Frame::new();
        frame.push_column("Type", Column::Text(vec!["L".into()])).unwrap();
        assert!(frame.numeric("Type").is_none());
        assert_eq!(frame.n_rows(), 1);
    }
}
