//! Runtime-shaped numeric arrays
//!
//! Decoded payloads and row lists arrive without a static rank. `NumericArray`
//! carries its shape alongside row-major data so the estimator can reject a
//! wrongly shaped input before touching any numbers.

use crate::error::{EstimationError, Result};

/// Dense row-major `f64` array with a runtime shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NumericArray {
    /// Build an array from an explicit shape; the data length must equal the
    /// product of the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| {
                EstimationError::shape(
                    "array shape",
                    "an element count that fits in usize",
                    format!("{shape:?}"),
                )
            })?;
        if expected != data.len() {
            return Err(EstimationError::shape(
                "array data",
                format!("{expected} element(s) for shape {shape:?}"),
                format!("{} element(s)", data.len()),
            ));
        }
        Ok(Self { shape, data })
    }

    /// Rank-0 array.
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    /// Rank-1 array.
    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Rank-2 array from a list of rows. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);

        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(EstimationError::shape(
                    "input row",
                    format!("{cols} column(s) in every row"),
                    format!("{} column(s) in row {idx}", row.len()),
                ));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            shape: vec![rows.len(), cols],
            data,
        })
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Length along the first axis (0 for a scalar).
    pub fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(data: Vec<f64>) -> Self {
        Self::vector(data)
    }
}
