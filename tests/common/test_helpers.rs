//! Helper functions for integration tests

use nalgebra::DVector;
use pie_rs::solver::{SilentProgress, SimulationResult, Solver, TimeGrid};
use pie_rs::system::OdeSystem;

/// Advance without progress reporting, panicking on failure
pub fn run(solver: &dyn Solver, system: &dyn OdeSystem, y0: &DVector<f64>, grid: &TimeGrid) -> SimulationResult {
    solver
        .advance(system, y0, grid, &SilentProgress)
        .unwrap_or_else(|e| panic!("{} failed: {e}", solver.name()))
}

/// Mean absolute difference
pub fn l1_error(actual: &DVector<f64>, expected: &DVector<f64>) -> f64 {
    assert_eq!(actual.len(), expected.len(), "dimension mismatch");
    (actual - expected).abs().sum() / actual.len() as f64
}

/// Largest absolute difference
pub fn max_error(actual: &DVector<f64>, expected: &DVector<f64>) -> f64 {
    assert_eq!(actual.len(), expected.len(), "dimension mismatch");
    (actual - expected).amax()
}

/// Observed order between two errors whose step sizes differ by `refinement`
pub fn convergence_rate(coarse: f64, fine: f64, refinement: f64) -> f64 {
    (coarse / fine).ln() / refinement.ln()
}
