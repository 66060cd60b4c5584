//! Typed inputs and outputs of the estimator
//!
//! - `Trajectory`: scalar state at each time step
//! - `InputSequence`: one input vector per time step (rows are time)
//! - `FittedModel`: A (echoed), B, and Q for `x[t+1] = A x[t] + B·u[t] + w[t]`

use nalgebra::{DMatrix, DVector};
use serde::{Serialize, Serializer};

use crate::array::NumericArray;
use crate::error::{EstimationError, Result};

/// Ordered scalar state observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory(DVector<f64>);

impl Trajectory {
    pub fn new(values: Vec<f64>) -> Self {
        Self(DVector::from_vec(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }
}

impl TryFrom<&NumericArray> for Trajectory {
    type Error = EstimationError;

    fn try_from(array: &NumericArray) -> Result<Self> {
        if array.ndim() != 1 {
            return Err(EstimationError::shape(
                "trajectory",
                "rank 1 (N,)",
                format!("rank {} {:?}", array.ndim(), array.shape()),
            ));
        }
        Ok(Self::new(array.as_slice().to_vec()))
    }
}

/// Input vectors aligned index-for-index with a trajectory.
///
/// Stored as an `N × k` matrix; row `i` is the input driving the transition
/// that starts at time `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSequence(DMatrix<f64>);

impl InputSequence {
    pub fn from_matrix(inputs: DMatrix<f64>) -> Self {
        Self(inputs)
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::try_from(&NumericArray::from_rows(rows)?)
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    /// Dimension `k` of every input vector.
    pub fn dim(&self) -> usize {
        self.0.ncols()
    }

    pub fn row(&self, idx: usize) -> Vec<f64> {
        self.0.row(idx).iter().copied().collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }
}

impl TryFrom<&NumericArray> for InputSequence {
    type Error = EstimationError;

    fn try_from(array: &NumericArray) -> Result<Self> {
        if array.ndim() != 2 {
            return Err(EstimationError::shape(
                "input sequence",
                "rank 2 (N, k)",
                format!("rank {} {:?}", array.ndim(), array.shape()),
            ));
        }
        let (rows, cols) = (array.shape()[0], array.shape()[1]);
        Ok(Self(DMatrix::from_row_slice(rows, cols, array.as_slice())))
    }
}

/// Result of a fixed-A fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedModel {
    /// Autoregressive coefficient supplied by the caller.
    pub a: f64,
    /// Input gains, one per input dimension.
    #[serde(serialize_with = "serialize_gains")]
    pub b: DVector<f64>,
    /// Process-noise variance, never negative.
    pub q: f64,
}

fn serialize_gains<S>(gains: &DVector<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(gains.iter())
}

impl FittedModel {
    /// One-step prediction `A * x_prev + B · u_prev`.
    pub fn predict(&self, x_prev: f64, u_prev: &[f64]) -> Result<f64> {
        if u_prev.len() != self.b.len() {
            return Err(EstimationError::shape(
                "prediction input",
                format!("{} component(s)", self.b.len()),
                format!("{} component(s)", u_prev.len()),
            ));
        }
        let drive: f64 = self.b.iter().zip(u_prev).map(|(b, u)| b * u).sum();
        Ok(self.a * x_prev + drive)
    }

    /// One-step prediction residuals over a trajectory (length `N - 1`).
    pub fn residuals(&self, x: &Trajectory, u: &InputSequence) -> Result<DVector<f64>> {
        if x.len() != u.len() {
            return Err(EstimationError::shape(
                "input sequence length",
                x.len().to_string(),
                u.len().to_string(),
            ));
        }
        if u.dim() != self.b.len() {
            return Err(EstimationError::shape(
                "input dimension",
                self.b.len().to_string(),
                u.dim().to_string(),
            ));
        }

        if x.len() < 2 {
            return Ok(DVector::zeros(0));
        }

        let m = x.len() - 1;
        let xs = x.as_vector();
        let predicted = xs.rows(0, m) * self.a + u.as_matrix().rows(0, m) * &self.b;
        Ok(xs.rows(1, m) - predicted)
    }
}
