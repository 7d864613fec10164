//! Temporal integration
//!
//! A temporal integrator advances an [`OdeSystem`](crate::system::OdeSystem)
//! along a [`TimeGrid`] and returns the trajectory at every grid point.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** ([`Scenario`]) - WHAT to solve
//!    - ODE system (usually a spatial operator)
//!    - Initial state
//!
//! 2. **Configuration** ([`SolverConfiguration`]) - HOW to solve
//!    - Time grid
//!    - Progress reporting
//!
//! 3. **Solver** ([`Solver`] trait) - The numerical method
//!    - Explicit Runge-Kutta, BDF, exponential integrators
//!    - Independent of the system being integrated
//!
//! Any solver can integrate any scenario; `advance` is the lower-level entry
//! point taking a system, an initial state, a grid and a [`ProgressReporter`].
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `SolverConfiguration`, `SimulationResult`
//! - **`time_grid`**: `TimeGrid` construction and validation
//! - **`scenario`**: `Scenario`
//! - **`progress`**: `ProgressReporter` observers
//! - **`methods`**: the integrators
//!
//! # Quick Start Example
//!
//! ```rust
//! use pie_rs::solver::{ExplicitRungeKutta, Scenario, Solver, SolverConfiguration};
//! use pie_rs::spatial::{FiniteDifferenceOperator, Mesh, SpatialOperator, Sine};
//!
//! // 1. Scenario (WHAT to solve)
//! let mesh = Mesh::uniform(0.0, 1.0, 100).unwrap();
//! let op = FiniteDifferenceOperator::new(mesh, 1, 1.0, 0.0).unwrap();
//! let dt = op.time_step(0.5, 1.0).unwrap();
//! let scenario = Scenario::from_spatial(op, &Sine { length: 1.0, periods: 1 });
//!
//! // 2. Configuration (HOW to solve)
//! let config = SolverConfiguration::with_step(1.0, dt).unwrap();
//!
//! // 3. Solve
//! let result = ExplicitRungeKutta::euler().solve(&scenario, &config).unwrap();
//! assert_eq!(result.time_points.last(), Some(&1.0));
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐   ┌──────────────────┐
//! │ Spatial operator│   │ Initial condition│
//! └────────┬────────┘   └────────┬─────────┘
//!          └──────────┬──────────┘
//!            ┌────────▼────────┐
//!            │    Scenario     │ ← WHAT to solve
//!            └────────┬────────┘
//!            ┌────────▼─────────────┐
//!            │ Solver Configuration │ ← HOW to solve
//!            └────────┬─────────────┘
//!            ┌────────▼────────┐
//!            │     Solver      │ ← The method
//!            └────────┬────────┘
//!            ┌────────▼────────────┐
//!            │ Simulation Result   │ ← The trajectory
//!            └─────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! Every entry point returns [`PieResult`](crate::error::PieResult). Every
//! accepted state is checked for NaN and infinity; a non-finite state aborts
//! the integration with `NonFiniteState`, which usually means the time step
//! is above the stability limit of an explicit method.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod methods;
mod progress;
mod scenario;
mod time_grid;
mod traits;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================
//
// Finite-difference Jacobians evaluate one column per state component. Above
// the threshold the columns go to Rayon (feature `parallel`).
//
// The value lives in an AtomicUsize so benchmarks and tests can change it at
// runtime. Relaxed ordering is enough: it is a performance hint.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of state components above which finite-difference Jacobian
/// columns are evaluated in parallel
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Current parallel-execution threshold
///
/// # Example
///
/// ```rust
/// use pie_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use pie_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Saves the threshold on construction and restores it on drop
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(new_value: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use progress::{LogProgress, ProgressReporter, SilentProgress};
pub use scenario::Scenario;
pub use time_grid::TimeGrid;
pub use traits::{SimulationResult, Solver, SolverConfiguration};

pub use methods::{
    Bdf, ButcherTableau, ConvergencePolicy, ExplicitRungeKutta, ExponentialEuler, ExponentialIntegrator,
    ExponentialVariant, NewtonSettings,
};

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DVector;

use crate::error::{PieError, PieResult};

/// Reject states holding NaN or infinite values
///
/// ```rust,ignore
/// validate_state(&state, 42, t)?;  // state accepted at step 42
/// ```
pub(crate) fn validate_state(state: &DVector<f64>, step: usize, time: f64) -> PieResult<()> {
    if state.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(PieError::NonFiniteState { step, time })
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_value() {
        assert_eq!(DEFAULT_PARALLEL_THRESHOLD, 999);
    }

    #[test]
    fn test_get_and_set_threshold() {
        let _guard = ThresholdGuard::save(500);
        assert_eq!(parallel_threshold(), 500);
    }

    #[test]
    #[should_panic(expected = "parallel threshold must be at least 1")]
    fn test_zero_threshold_panics() {
        set_parallel_threshold(0);
    }

    #[test]
    fn test_threshold_guard_restores_previous_value() {
        let before = parallel_threshold();
        {
            let _guard = ThresholdGuard::save(42);
            assert_eq!(parallel_threshold(), 42);
        }
        assert_eq!(parallel_threshold(), before);
    }

    #[test]
    fn test_validate_state() {
        assert!(validate_state(&DVector::from_vec(vec![1.0, -2.0]), 1, 0.1).is_ok());
        assert_eq!(
            validate_state(&DVector::from_vec(vec![1.0, f64::NAN]), 3, 0.3),
            Err(PieError::NonFiniteState { step: 3, time: 0.3 })
        );
        assert!(validate_state(&DVector::from_vec(vec![f64::INFINITY]), 1, 0.0).is_err());
    }
}
