//! statedyn - fixed-coefficient state dynamics estimation
//!
//! Estimates the input gains `B` and process-noise variance `Q` of the scalar
//! linear-Gaussian transition
//!
//! ```text
//! x[t+1] = A x[t] + B·u[t] + w[t],   w[t] ~ N(0, Q)
//! ```
//!
//! from one complete trajectory, holding the autoregressive coefficient `A`
//! fixed at a caller-supplied value. The fit is a single batch least-squares
//! pass solved through an SVD, so rank-deficient inputs return the
//! minimum-norm gains rather than an error.
//!
//! ```
//! use statedyn::{fit_state_dynamics, NumericArray};
//!
//! let x = NumericArray::vector(vec![0.0, 1.0, 1.95, 2.8525]);
//! let u = NumericArray::from_rows(&[vec![1.0], vec![1.0], vec![1.0], vec![1.0]]).unwrap();
//! let model = fit_state_dynamics(&x, &u, 0.95).unwrap();
//! assert!((model.b[0] - 1.0).abs() < 1e-10);
//! assert!(model.q < 1e-20);
//! ```

pub mod array;
pub mod error;
pub mod estimator;
pub mod lstsq;
pub mod model;
pub mod sim;

// Re-export main types
pub use array::NumericArray;
pub use error::EstimationError;
pub use estimator::{fit_state_dynamics, FitDiagnostics, StateDynamicsEstimator};
pub use lstsq::{solve_min_norm, LeastSquaresSolution};
pub use model::{FittedModel, InputSequence, Trajectory};
