//! Error type shared by every estimation entry point.

use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("{context} shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        context: &'static str,
        expected: String,
        got: String,
    },
    #[error(
        "insufficient samples: {transitions} transition(s) cannot support {parameters} estimated gain(s)"
    )]
    InsufficientSamples { transitions: usize, parameters: usize },
    #[error("non-finite value in {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },
    #[error("non-finite value in {what} at row {row}, column {col}")]
    NonFiniteEntry {
        what: &'static str,
        row: usize,
        col: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("decomposition failed: {0}")]
    Decomposition(&'static str),
}

impl EstimationError {
    pub(crate) fn shape(
        context: &'static str,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }

    pub fn is_insufficient_samples(&self) -> bool {
        matches!(self, Self::InsufficientSamples { .. })
    }
}

pub type Result<T> = std::result::Result<T, EstimationError>;

pub(crate) fn ensure_finite(what: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(EstimationError::NonFinite { what, index }),
        None => Ok(()),
    }
}

/// Row-major scan so the reported position matches how the rows were given.
pub(crate) fn ensure_finite_rows(what: &'static str, values: &DMatrix<f64>) -> Result<()> {
    for (row, entries) in values.row_iter().enumerate() {
        if let Some(col) = entries.iter().position(|v| !v.is_finite()) {
            return Err(EstimationError::NonFiniteEntry { what, row, col });
        }
    }
    Ok(())
}
