//! Synthetic trajectories for the fixed-A transition model
//!
//! Generates `x[t+1] = A x[t] + B·u[t] + w[t]` with Gaussian inputs and
//! process noise from a seeded RNG, so a run is reproducible bit for bit.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{EstimationError, Result};
use crate::model::{InputSequence, Trajectory};

/// Simulation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of observations N
    pub steps: usize,
    pub a: f64,
    /// True input gains; the input dimension is `b.len()`
    pub b: Vec<f64>,
    /// Standard deviation of each input component
    pub input_std: f64,
    /// Process-noise standard deviation (sqrt of Q)
    pub noise_std: f64,
    pub x0: f64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 500,
            a: 0.95,
            b: vec![1.0, -0.5],
            input_std: 1.0,
            noise_std: 0.1,
            x0: 0.0,
            seed: 42,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(EstimationError::InvalidConfig(
                "steps must be greater than zero".to_string(),
            ));
        }
        if !self.a.is_finite() || !self.x0.is_finite() || self.b.iter().any(|b| !b.is_finite()) {
            return Err(EstimationError::InvalidConfig(
                "a, x0, and b must be finite".to_string(),
            ));
        }
        if !(self.input_std.is_finite() && self.input_std >= 0.0) {
            return Err(EstimationError::InvalidConfig(
                "input_std must be finite and >= 0".to_string(),
            ));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(EstimationError::InvalidConfig(
                "noise_std must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A simulated state trajectory and the inputs that drove it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSystem {
    pub x: Trajectory,
    pub u: InputSequence,
}

pub fn simulate(config: &SimConfig) -> Result<SimulatedSystem> {
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let input_dist = Normal::new(0.0, config.input_std)
        .map_err(|err| EstimationError::InvalidConfig(format!("input_std: {err}")))?;
    let noise_dist = Normal::new(0.0, config.noise_std)
        .map_err(|err| EstimationError::InvalidConfig(format!("noise_std: {err}")))?;

    let k = config.b.len();
    let inputs = DMatrix::from_fn(config.steps, k, |_, _| input_dist.sample(&mut rng));

    let mut x = Vec::with_capacity(config.steps);
    x.push(config.x0);
    for t in 0..config.steps - 1 {
        let drive: f64 = inputs
            .row(t)
            .iter()
            .zip(&config.b)
            .map(|(u, b)| u * b)
            .sum();
        let next = config.a * x[t] + drive + noise_dist.sample(&mut rng);
        x.push(next);
    }

    Ok(SimulatedSystem {
        x: Trajectory::new(x),
        u: InputSequence::from_matrix(inputs),
    })
}
