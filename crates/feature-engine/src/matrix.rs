//! Named Feature Matrix

use crate::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_DIMENSION};
use crate::FeatureError;
use ndarray::{Array2, ArrayView1, Axis};
use sensor_data::{Column, Frame};

/// Row-major feature matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap an array; the column count must match the names
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self, FeatureError> {
        if names.len() != values.ncols() {
            return Err(FeatureError::ShapeMismatch {
                expected: names.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self { names, values })
    }

    /// Stack feature vectors in `FEATURE_COLUMNS` order
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let flat: Vec<f64> = vectors.iter().flat_map(|v| v.values()).collect();
        let values = Array2::from_shape_vec((vectors.len(), FEATURE_DIMENSION), flat)
            .unwrap_or_else(|_| Array2::zeros((0, FEATURE_DIMENSION)));
        Self {
            names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Column view by name
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values.column(i))
    }

    /// Columns in the given order; unknown names are a configuration error
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<FeatureMatrix, FeatureError> {
        let indices = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.names
                    .iter()
                    .position(|n| n == name)
                    .ok_or_else(|| FeatureError::UnknownFeature(name.to_string()))
            })
            .collect::<Result<Vec<usize>, _>>()?;

        Ok(FeatureMatrix {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            values: self.values.select(Axis(1), &indices),
        })
    }

    /// Single-row matrix holding row `index`
    pub fn row(&self, index: usize) -> Result<FeatureMatrix, FeatureError> {
        if index >= self.n_rows() {
            return Err(FeatureError::RowOutOfBounds {
                index,
                rows: self.n_rows(),
            });
        }
        Ok(FeatureMatrix {
            names: self.names.clone(),
            values: self.values.select(Axis(0), &[index]),
        })
    }

    /// Subset of rows, in the given order
    pub fn rows(&self, indices: &[usize]) -> Result<FeatureMatrix, FeatureError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.n_rows()) {
            return Err(FeatureError::RowOutOfBounds {
                index,
                rows: self.n_rows(),
            });
        }
        Ok(FeatureMatrix {
            names: self.names.clone(),
            values: self.values.select(Axis(0), indices),
        })
    }

    /// Numeric frame view, one column per feature
    pub fn to_frame(&self) -> Frame {
        let mut frame = Frame::new();
        for (i, name) in self.names.iter().enumerate() {
            let column = Column::Numeric(self.values.column(i).to_vec());
            // names are unique and columns equally long by construction
            let _ = frame.push_column(name.clone(), column);
        }
        frame
    }
}
