//! Backward differentiation formulas (BDF 1-6)
//!
//! # Mathematical Background
//!
//! The order-`k` formula relates the new state to the `k` previous ones:
//!
//! ```text
//! y_{n+1} = Σ_{j=0}^{k-1} α_j y_{n-j} + β h f(y_{n+1}, t_{n+1})
//! ```
//!
//! Every step is a nonlinear solve in `y_{n+1}`. Newton is applied to
//!
//! ```text
//! G(u)  = u - Σ α_j y_{n-j} - β h f(u, t_{n+1})
//! G'(u) = I - β h J(u, t_{n+1})
//! ```
//!
//! with the analytic Jacobian when the system provides one, a central
//! finite-difference Jacobian otherwise. The initial guess is `y_n`.
//!
//! # Start-up
//!
//! The first `k - 1` steps have too little history; they are taken with the
//! classical RK4 scheme.
//!
//! # Stability
//!
//! BDF1 and BDF2 are A-stable, higher orders are A(α)-stable down to a
//! shrinking sector; orders above 6 are unstable and not offered.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::{DMatrix, DVector};
//! use pie_rs::solver::{Bdf, SilentProgress, Solver, TimeGrid};
//! use pie_rs::system::OdeProblem;
//!
//! // Very stiff decay, far beyond the explicit stability limit
//! let stiff = OdeProblem::new("stiff", 1, |y, _t| y * -1000.0)
//!     .with_jacobian(|_y, _t| DMatrix::from_element(1, 1, -1000.0));
//! let grid = TimeGrid::uniform(0.0, 1.0, 10).unwrap();
//!
//! let result = Bdf::new(1).unwrap()
//!     .advance(&stiff, &DVector::from_element(1, 1.0), &grid, &SilentProgress)
//!     .unwrap();
//! assert!(result.final_state[0].abs() < 1e-10);
//! ```

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};
use crate::linalg::numerical_jacobian;
use crate::solver::methods::newton::{self, ConvergencePolicy, NewtonSettings};
use crate::solver::methods::runge_kutta::ButcherTableau;
use crate::solver::traits::check_initial_state;
use crate::solver::{ProgressReporter, SimulationResult, Solver, TimeGrid, validate_state};
use crate::system::OdeSystem;

/// Highest supported order
pub const MAX_BDF_ORDER: usize = 6;

/// `(α, β)` of the order-`k` formula, `α` ordered from the most recent state
fn coefficients(order: usize) -> (&'static [f64], f64) {
    const A1: [f64; 1] = [1.0];
    const A2: [f64; 2] = [4.0 / 3.0, -1.0 / 3.0];
    const A3: [f64; 3] = [18.0 / 11.0, -9.0 / 11.0, 2.0 / 11.0];
    const A4: [f64; 4] = [48.0 / 25.0, -36.0 / 25.0, 16.0 / 25.0, -3.0 / 25.0];
    const A5: [f64; 5] = [300.0 / 137.0, -300.0 / 137.0, 200.0 / 137.0, -75.0 / 137.0, 12.0 / 137.0];
    const A6: [f64; 6] = [360.0 / 147.0, -450.0 / 147.0, 400.0 / 147.0, -225.0 / 147.0, 72.0 / 147.0, -10.0 / 147.0];

    match order {
        1 => (&A1, 1.0),
        2 => (&A2, 2.0 / 3.0),
        3 => (&A3, 6.0 / 11.0),
        4 => (&A4, 12.0 / 25.0),
        5 => (&A5, 60.0 / 137.0),
        _ => (&A6, 60.0 / 147.0),
    }
}

/// Implicit BDF integrator of fixed order
#[derive(Debug, Clone, PartialEq)]
pub struct Bdf {
    order: usize,
    newton: NewtonSettings,
    policy: ConvergencePolicy,
}

impl Bdf {
    /// BDF of order 1 to 6 with default Newton settings and the `Warn` policy
    pub fn new(order: usize) -> PieResult<Self> {
        if !(1..=MAX_BDF_ORDER).contains(&order) {
            return Err(PieError::InvalidOrder { method: "BDF", order });
        }
        Ok(Self {
            order,
            newton: NewtonSettings::default(),
            policy: ConvergencePolicy::default(),
        })
    }

    pub fn with_newton(mut self, newton: NewtonSettings) -> PieResult<Self> {
        newton.validate()?;
        self.newton = newton;
        Ok(self)
    }

    pub fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn newton(&self) -> &NewtonSettings {
        &self.newton
    }

    pub fn policy(&self) -> ConvergencePolicy {
        self.policy
    }

    /// One implicit step from `history` (most recent first) to `t_next`
    fn step(
        &self,
        system: &dyn OdeSystem,
        history: &[DVector<f64>],
        t_next: f64,
        h: f64,
        step: usize,
    ) -> PieResult<(DVector<f64>, usize)> {
        let (alpha, beta) = coefficients(self.order);
        let bh = beta * h;

        let mut known = DVector::zeros(system.dim());
        for (a, y) in alpha.iter().zip(history) {
            known.axpy(*a, y, 1.0);
        }

        let residual = |u: &DVector<f64>| -> PieResult<DVector<f64>> {
            let f = system.rhs(u, t_next)?;
            Ok(u - &known - f * bh)
        };
        let jacobian = |u: &DVector<f64>| -> PieResult<DMatrix<f64>> {
            let j = if system.provides_jacobian() {
                system.jac(u, t_next)?
            } else {
                numerical_jacobian(|v| system.rhs(v, t_next), u, self.newton.fd_epsilon)?
            };
            Ok(DMatrix::identity(u.len(), u.len()) - j * bh)
        };

        let outcome = newton::solve(residual, jacobian, history[0].clone(), &self.newton)?;

        if !outcome.converged {
            match self.policy {
                ConvergencePolicy::Fail => {
                    return Err(PieError::ConvergenceFailure {
                        step,
                        time: t_next,
                        iterations: outcome.iterations,
                        residual: outcome.residual,
                    });
                }
                ConvergencePolicy::Warn => warn!(
                    "BDF{}: no convergence at step {} (t = {}) after {} iterations, residual {:.3e}; keeping last iterate",
                    self.order, step, t_next, outcome.iterations, outcome.residual
                ),
            }
        }

        Ok((outcome.solution, outcome.iterations))
    }
}

impl Solver for Bdf {
    fn advance(
        &self,
        system: &dyn OdeSystem,
        y0: &DVector<f64>,
        grid: &TimeGrid,
        progress: &dyn ProgressReporter,
    ) -> PieResult<SimulationResult> {
        check_initial_state(system, y0, grid.start())?;

        let times = grid.points();
        let steps = grid.steps();
        let startup = ButcherTableau::rk4();
        let bootstrap = (self.order - 1).min(steps);

        let mut state_trajectory: Vec<DVector<f64>> = Vec::with_capacity(times.len());
        state_trajectory.push(y0.clone());

        for i in 0..bootstrap {
            let (t, h) = (times[i], times[i + 1] - times[i]);
            let next = startup.step(system, &state_trajectory[i], t, h)?;
            validate_state(&next, i + 1, times[i + 1])?;
            state_trajectory.push(next);
            progress.report(i + 1, steps);
        }
        if bootstrap > 0 {
            debug!("BDF{}: {} start-up steps with RK4", self.order, bootstrap);
        }

        let mut newton_iterations = 0;
        for i in bootstrap..steps {
            let (t_next, h) = (times[i + 1], times[i + 1] - times[i]);

            // Most recent state first
            let history: Vec<DVector<f64>> = state_trajectory[i + 1 - self.order..=i]
                .iter()
                .rev()
                .cloned()
                .collect();

            let (next, iterations) = self.step(system, &history, t_next, h, i + 1)?;
            newton_iterations += iterations;
            validate_state(&next, i + 1, t_next)?;

            state_trajectory.push(next);
            progress.report(i + 1, steps);
        }

        let final_state = state_trajectory[state_trajectory.len() - 1].clone();
        let mut result = SimulationResult::new(times.to_vec(), state_trajectory, final_state);
        result.add_metadata("solver", &format!("BDF{}", self.order));
        result.add_metadata("time steps", &steps.to_string());
        result.add_metadata("start-up steps", &bootstrap.to_string());
        result.add_metadata("newton iterations", &newton_iterations.to_string());
        result.add_metadata(
            "jacobian",
            if system.provides_jacobian() { "analytic" } else { "finite difference" },
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        match self.order {
            1 => "BDF1",
            2 => "BDF2",
            3 => "BDF3",
            4 => "BDF4",
            5 => "BDF5",
            _ => "BDF6",
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
