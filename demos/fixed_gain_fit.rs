//! Fixed-Gain Fit Example
//!
//! Simulates a trajectory with known gains and noise, then recovers B and Q
//! with A held at its true value.

use statedyn::sim::{simulate, SimConfig};
use statedyn::StateDynamicsEstimator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Running fixed-A state dynamics fit...\n");

    let config = SimConfig {
        steps: 5_000,
        a: 0.95,
        b: vec![1.0, -0.5, 0.25],
        input_std: 1.0,
        noise_std: 0.2,
        x0: 0.0,
        seed: 42,
    };

    println!("Configuration:");
    println!("  Steps: {}", config.steps);
    println!("  A (fixed): {}", config.a);
    println!("  True B: {:?}", config.b);
    println!("  True Q: {:.6}", config.noise_std * config.noise_std);
    println!();

    let sys = simulate(&config)?;
    let (model, diagnostics) =
        StateDynamicsEstimator::new().fit_with_diagnostics(&sys.x, &sys.u, config.a)?;

    println!("FIT SUMMARY");
    println!("===========");
    println!("  Transitions: {}", diagnostics.transitions);
    println!("  Rank: {}/{}", diagnostics.rank, diagnostics.parameters);
    for (i, (est, truth)) in model.b.iter().zip(&config.b).enumerate() {
        println!("  B[{i}]: {est:>10.6}  (true {truth:>8.4}, err {:.2e})", (est - truth).abs());
    }
    println!(
        "  Q:    {:>10.6}  (true {:>8.4})",
        model.q,
        config.noise_std * config.noise_std
    );
    println!("  RSS:  {:>10.6}", diagnostics.rss);

    Ok(())
}
