//! Newton iteration for implicit steps
//!
//! Solves `G(u) = 0` with
//!
//! ```text
//! u_{k+1} = u_k - G'(u_k)⁻¹ G(u_k)
//! ```
//!
//! using an LU factorisation of the Jacobian at every iteration. The outcome
//! always carries the last iterate: callers decide whether a non-converged
//! solve is acceptable ([`ConvergencePolicy`]).

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};

/// Newton stopping parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSettings {
    /// Converged when both `‖G(u)‖∞` and `‖Δu‖∞` fall below
    /// `tolerance · (1 + ‖u‖∞)` (default 1e-10)
    pub tolerance: f64,

    /// Maximum Newton iterations (default 50)
    pub max_iterations: usize,

    /// Finite-difference step when no analytic Jacobian is available (default 1e-7)
    pub fd_epsilon: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 50,
            fd_epsilon: 1e-7,
        }
    }
}

impl NewtonSettings {
    pub(crate) fn validate(&self) -> PieResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PieError::InvalidConfiguration {
                reason: format!("Newton tolerance must be positive, got {}", self.tolerance),
            });
        }
        if self.max_iterations == 0 {
            return Err(PieError::InvalidConfiguration {
                reason: "Newton needs at least one iteration".to_string(),
            });
        }
        if !(self.fd_epsilon.is_finite() && self.fd_epsilon > 0.0) {
            return Err(PieError::InvalidConfiguration {
                reason: format!("finite-difference step must be positive, got {}", self.fd_epsilon),
            });
        }
        Ok(())
    }
}

/// What to do with an implicit step whose nonlinear solve did not converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergencePolicy {
    /// Log a warning and accept the last iterate
    #[default]
    Warn,

    /// Abort with `ConvergenceFailure`
    Fail,
}

/// Result of a Newton solve
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonOutcome {
    /// Last iterate
    pub solution: DVector<f64>,

    pub iterations: usize,

    /// `‖G(solution)‖∞`
    pub residual: f64,

    pub converged: bool,
}

/// Run Newton from `guess`
///
/// `residual(u)` evaluates `G(u)`, `jacobian(u)` evaluates `G'(u)`.
/// A singular Jacobian stops the iteration and returns the current iterate
/// as non-converged.
pub fn solve<R, J>(residual: R, jacobian: J, guess: DVector<f64>, settings: &NewtonSettings) -> PieResult<NewtonOutcome>
where
    R: Fn(&DVector<f64>) -> PieResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> PieResult<DMatrix<f64>>,
{
    let mut u = guess;
    let mut g = residual(&u)?;
    let mut norm = g.amax();

    for iteration in 1..=settings.max_iterations {
        let lu = jacobian(&u)?.lu();
        let Some(delta) = lu.solve(&g) else {
            debug!("Newton: singular Jacobian at iteration {iteration}");
            return Ok(NewtonOutcome {
                solution: u,
                iterations: iteration,
                residual: norm,
                converged: false,
            });
        };

        u -= &delta;
        g = residual(&u)?;
        norm = g.amax();

        if !norm.is_finite() {
            return Ok(NewtonOutcome {
                solution: u,
                iterations: iteration,
                residual: norm,
                converged: false,
            });
        }
        let scale = settings.tolerance * (1.0 + u.amax());
        if norm <= scale && delta.amax() <= scale {
            debug!("Newton: converged in {iteration} iterations (residual {norm:.3e})");
            return Ok(NewtonOutcome {
                solution: u,
                iterations: iteration,
                residual: norm,
                converged: true,
            });
        }
    }

    Ok(NewtonOutcome {
        solution: u,
        iterations: settings.max_iterations,
        residual: norm,
        converged: false,
    })
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_root_of_two() {
        let outcome = solve(
            |u| Ok(u.map(|x| x * x - 2.0)),
            |u| Ok(DMatrix::from_diagonal(&u.map(|x| 2.0 * x))),
            DVector::from_element(1, 1.0),
            &NewtonSettings::default(),
        )
        .unwrap();

        assert!(outcome.converged);
        assert!(outcome.iterations < 10);
        assert_relative_eq!(outcome.solution[0], 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_system_in_one_step() {
        let a = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![9.0, 8.0]);
        let outcome = solve(
            |u| Ok(&a * u - &b),
            |_u| Ok(a.clone()),
            DVector::zeros(2),
            &NewtonSettings::default(),
        )
        .unwrap();

        assert!(outcome.converged);
        assert!(outcome.iterations <= 2);
        assert_relative_eq!(outcome.solution[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(outcome.solution[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_large_magnitude_solution() {
        // Rounding alone leaves |G| near 1e-9 at this scale
        let outcome = solve(
            |u| Ok(u * 1.1 - DVector::from_element(1, 1e8)),
            |_u| Ok(DMatrix::from_element(1, 1, 1.1)),
            DVector::from_element(1, 1e8),
            &NewtonSettings::default(),
        )
        .unwrap();

        assert!(outcome.converged);
        assert!(outcome.iterations <= 2);
        assert_relative_eq!(outcome.solution[0], 1e8 / 1.1, max_relative = 1e-14);
    }

    #[test]
    fn test_iteration_cap_keeps_last_iterate() {
        // No real root: u² + 1 = 0
        let settings = NewtonSettings {
            max_iterations: 5,
            ..NewtonSettings::default()
        };
        let outcome = solve(
            |u| Ok(u.map(|x| x * x + 1.0)),
            |u| Ok(DMatrix::from_diagonal(&u.map(|x| 2.0 * x))),
            DVector::from_element(1, 0.7),
            &settings,
        )
        .unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 5);
        assert!(outcome.residual >= 1.0);
    }

    #[test]
    fn test_singular_jacobian() {
        let outcome = solve(
            |u| Ok(u.map(|x| x * x + 1.0)),
            |u| Ok(DMatrix::from_diagonal(&u.map(|x| 2.0 * x))),
            DVector::zeros(1),
            &NewtonSettings::default(),
        )
        .unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.solution[0], 0.0);
    }

    #[test]
    fn test_settings_validation() {
        assert!(NewtonSettings::default().validate().is_ok());
        let bad = NewtonSettings {
            tolerance: 0.0,
            ..NewtonSettings::default()
        };
        assert!(bad.validate().is_err());
    }
}
