//! Fixed-A state dynamics estimator
//!
//! Fits `x[t+1] = A x[t] + B·u[t] + w[t]`, `w ~ N(0, Q)`, for a caller-supplied
//! scalar `A`:
//!
//! 1. validate shapes, finiteness, and sample count
//! 2. form `y[t] = x[t+1] - A x[t]` over the `N - 1` transitions
//! 3. solve `y ≈ u[0..N-1] B` with the minimum-norm SVD solver
//! 4. report `Q` as the residual variance with `k` degrees of freedom removed

use nalgebra::{DMatrix, DVector};

use crate::array::NumericArray;
use crate::error::{ensure_finite, ensure_finite_rows, EstimationError, Result};
use crate::lstsq::solve_min_norm;
use crate::model::{FittedModel, InputSequence, Trajectory};

/// Summary of the regression behind a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    /// Number of transition samples, `N - 1`.
    pub transitions: usize,
    /// Number of estimated gains, `k`.
    pub parameters: usize,
    /// Numerical rank of the input design matrix.
    pub rank: usize,
    /// Residual sum of squares.
    pub rss: f64,
    pub singular_values: Vec<f64>,
}

/// Batch estimator for the input gains and process-noise variance.
///
/// Stateless apart from the singular-value cutoff, so one instance can be
/// shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateDynamicsEstimator {
    rcond: Option<f64>,
}

impl StateDynamicsEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a relative singular-value cutoff instead of `eps * max(rows, cols)`.
    pub fn with_rcond(rcond: f64) -> Self {
        Self { rcond: Some(rcond) }
    }

    pub fn rcond(&self) -> Option<f64> {
        self.rcond
    }

    pub fn fit(&self, x: &Trajectory, u: &InputSequence, a: f64) -> Result<FittedModel> {
        self.fit_with_diagnostics(x, u, a).map(|(model, _)| model)
    }

    /// Fit from runtime-shaped arrays; `x` must be rank 1 and `u` rank 2.
    pub fn fit_arrays(&self, x: &NumericArray, u: &NumericArray, a: f64) -> Result<FittedModel> {
        let x = Trajectory::try_from(x)?;
        let u = InputSequence::try_from(u)?;
        self.fit(&x, &u, a)
    }

    pub fn fit_with_diagnostics(
        &self,
        x: &Trajectory,
        u: &InputSequence,
        a: f64,
    ) -> Result<(FittedModel, FitDiagnostics)> {
        validate(x, u, a)?;

        let (design, response) = transition_system(x, u, a);
        // Finite observations can still overflow once A x[t] is subtracted.
        ensure_finite("transition response", response.as_slice())?;
        let k = design.ncols();
        let solution = solve_min_norm(&design, &response, self.rcond)?;
        ensure_finite("input gains", solution.coefficients.as_slice())?;

        let residuals = &response - &design * &solution.coefficients;
        let q = residual_variance(&residuals, k)?;
        let rss = residuals.norm_squared();

        if solution.rank < k {
            tracing::debug!(
                rank = solution.rank,
                parameters = k,
                "input design is rank deficient; returning minimum-norm gains"
            );
        }
        tracing::debug!(transitions = response.len(), parameters = k, a, q, "fitted state dynamics");

        let diagnostics = FitDiagnostics {
            transitions: response.len(),
            parameters: k,
            rank: solution.rank,
            rss,
            singular_values: solution.singular_values,
        };
        let model = FittedModel {
            a,
            b: solution.coefficients,
            q,
        };
        Ok((model, diagnostics))
    }
}

/// Fit with the default estimator from runtime-shaped arrays.
pub fn fit_state_dynamics(x: &NumericArray, u: &NumericArray, a: f64) -> Result<FittedModel> {
    StateDynamicsEstimator::new().fit_arrays(x, u, a)
}

fn validate(x: &Trajectory, u: &InputSequence, a: f64) -> Result<()> {
    if x.len() != u.len() {
        return Err(EstimationError::shape(
            "input sequence length",
            format!("{} row(s) to match the trajectory", x.len()),
            format!("{} row(s)", u.len()),
        ));
    }

    if !a.is_finite() {
        return Err(EstimationError::NonFinite {
            what: "coefficient A",
            index: 0,
        });
    }
    ensure_finite("trajectory", x.as_slice())?;
    ensure_finite_rows("input sequence", u.as_matrix())?;

    let transitions = x.len().saturating_sub(1);
    let parameters = u.dim();
    if transitions == 0 || transitions <= parameters {
        return Err(EstimationError::InsufficientSamples {
            transitions,
            parameters,
        });
    }

    Ok(())
}

/// Inputs `u[0..N-1]` and de-trended response `x[1..N] - A x[0..N-1]`.
fn transition_system(x: &Trajectory, u: &InputSequence, a: f64) -> (DMatrix<f64>, DVector<f64>) {
    let m = x.len() - 1;
    let xs = x.as_vector();
    let design = u.as_matrix().rows(0, m).into_owned();
    let response = xs.rows(1, m) - xs.rows(0, m) * a;
    (design, response)
}

/// Sample variance with `ddof` degrees of freedom removed, clamped at zero.
fn residual_variance(residuals: &DVector<f64>, ddof: usize) -> Result<f64> {
    let n = residuals.len();
    if n <= ddof {
        return Err(EstimationError::InsufficientSamples {
            transitions: n,
            parameters: ddof,
        });
    }

    let mean = residuals.mean();
    let ss: f64 = residuals.iter().map(|r| (r - mean) * (r - mean)).sum();
    let variance = ss / (n - ddof) as f64;
    if !variance.is_finite() {
        return Err(EstimationError::NonFinite {
            what: "residual variance",
            index: 0,
        });
    }
    Ok(if variance < 0.0 { 0.0 } else { variance })
}
