//! Minimum-norm linear least squares via SVD.
//!
//! Solves `min_b ||X b - y||²` as `b = V Σ⁺ Uᵀ y`. Singular values at or below
//! `rcond * σ_max` are treated as zero, so a rank-deficient design yields the
//! minimum-Euclidean-norm minimiser instead of an error. The default cutoff
//! matches `eps * max(rows, cols)`.

use nalgebra::{DMatrix, DVector};

use crate::error::{EstimationError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresSolution {
    pub coefficients: DVector<f64>,
    /// Number of singular values above the cutoff.
    pub rank: usize,
    /// Singular values in descending order.
    pub singular_values: Vec<f64>,
}

/// Relative singular-value cutoff used when the caller does not pick one.
pub fn default_rcond(rows: usize, cols: usize) -> f64 {
    f64::EPSILON * rows.max(cols) as f64
}

pub fn solve_min_norm(
    design: &DMatrix<f64>,
    rhs: &DVector<f64>,
    rcond: Option<f64>,
) -> Result<LeastSquaresSolution> {
    let (rows, cols) = design.shape();
    if rhs.len() != rows {
        return Err(EstimationError::shape(
            "least-squares right-hand side",
            rows.to_string(),
            rhs.len().to_string(),
        ));
    }

    if rows == 0 || cols == 0 {
        return Ok(LeastSquaresSolution {
            coefficients: DVector::zeros(cols),
            rank: 0,
            singular_values: Vec::new(),
        });
    }

    // Negative or non-finite cutoffs fall back to machine precision.
    let rcond = rcond
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or_else(|| default_rcond(rows, cols));

    let svd = design.clone().svd(true, true);
    let u = svd
        .u
        .as_ref()
        .ok_or(EstimationError::Decomposition("left singular vectors were not computed"))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or(EstimationError::Decomposition("right singular vectors were not computed"))?;

    let sigma = &svd.singular_values;
    let sigma_max = sigma.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = rcond * sigma_max;

    let mut projected = u.transpose() * rhs;
    let mut rank = 0;
    for (i, &s) in sigma.iter().enumerate() {
        if s > cutoff {
            projected[i] /= s;
            rank += 1;
        } else {
            projected[i] = 0.0;
        }
    }
    let coefficients = v_t.transpose() * projected;

    let mut singular_values: Vec<f64> = sigma.iter().copied().collect();
    singular_values.sort_by(|a, b| b.total_cmp(a));

    tracing::trace!(rows, cols, rank, cutoff, "solved least-squares system");

    Ok(LeastSquaresSolution {
        coefficients,
        rank,
        singular_values,
    })
}
