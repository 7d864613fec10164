//! Explicit Runge-Kutta integrators
//!
//! # Mathematical Background
//!
//! An `s`-stage explicit scheme is defined by its Butcher tableau `(A, b, c)`
//! with `A` strictly lower triangular and nodes `c_j = Σ_{k<j} a_jk`:
//!
//! ```text
//! p_j     = f(y_n + h Σ_{k<j} a_jk p_k,  t_n + c_j h)     j = 1..s
//! y_{n+1} = y_n + h Σ_j b_j p_j
//! ```
//!
//! Stages only read earlier stages, so they are evaluated in index order.
//!
//! # Presets
//!
//! | Tableau                          | Order | Stages |
//! |----------------------------------|-------|--------|
//! | [`ButcherTableau::euler`]        | 1     | 1      |
//! | [`ButcherTableau::midpoint`]     | 2     | 2      |
//! | [`ButcherTableau::rk4`]          | 4     | 4      |
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DVector;
//! use pie_rs::solver::{ExplicitRungeKutta, SilentProgress, Solver, TimeGrid};
//! use pie_rs::system::OdeProblem;
//!
//! let growth = OdeProblem::new("growth", 1, |y, _t| y.clone());
//! let grid = TimeGrid::uniform(0.0, 1.0, 10).unwrap();
//!
//! let result = ExplicitRungeKutta::euler()
//!     .advance(&growth, &DVector::from_element(1, 1.0), &grid, &SilentProgress)
//!     .unwrap();
//!
//! // (1 + 0.1)^10
//! assert!((result.final_state[0] - 1.1_f64.powi(10)).abs() < 1e-12);
//! ```

use std::fmt;

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};
use crate::solver::traits::check_initial_state;
use crate::solver::{ProgressReporter, SimulationResult, Solver, TimeGrid, validate_state};
use crate::system::OdeSystem;

/// Largest allowed deviation of `Σ b` from 1
const WEIGHT_SUM_TOLERANCE: f64 = 1e-12;

// =================================================================================================
// Butcher tableau
// =================================================================================================

/// Coefficients of an explicit Runge-Kutta scheme
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau {
    name: String,
    a: DMatrix<f64>,
    b: DVector<f64>,
    c: DVector<f64>,
}

impl ButcherTableau {
    /// Validated explicit tableau; the nodes `c` are derived from `A`
    ///
    /// # Errors
    ///
    /// `InvalidTableau` when the shapes disagree, `A` is not strictly lower
    /// triangular, a coefficient is not finite, or the weights do not sum to 1.
    pub fn new(name: impl Into<String>, a: DMatrix<f64>, b: DVector<f64>) -> PieResult<Self> {
        let s = b.len();
        if s == 0 {
            return Err(PieError::InvalidTableau {
                reason: "at least one stage is required".to_string(),
            });
        }
        if a.shape() != (s, s) {
            return Err(PieError::InvalidTableau {
                reason: format!("shapes disagree: A is {}x{}, b has {} entries", a.nrows(), a.ncols(), s),
            });
        }
        if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
            return Err(PieError::InvalidTableau {
                reason: "non-finite coefficient".to_string(),
            });
        }
        for j in 0..s {
            for k in j..s {
                if a[(j, k)] != 0.0 {
                    return Err(PieError::InvalidTableau {
                        reason: format!("A[{j}, {k}] = {} makes the scheme implicit", a[(j, k)]),
                    });
                }
            }
        }
        if (b.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PieError::InvalidTableau {
                reason: format!("weights sum to {} instead of 1", b.sum()),
            });
        }

        Ok(Self::assemble(name, a, b))
    }

    /// Tableau with `c_j = Σ_{k<j} a_jk`; `A` is assumed strictly lower triangular
    fn assemble(name: impl Into<String>, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        let c = DVector::from_fn(b.len(), |j, _| (0..j).map(|k| a[(j, k)]).sum());
        Self {
            name: name.into(),
            a,
            b,
            c,
        }
    }

    /// Forward Euler
    pub fn euler() -> Self {
        Self::assemble("Forward Euler", DMatrix::zeros(1, 1), DVector::from_element(1, 1.0))
    }

    /// Explicit midpoint
    pub fn midpoint() -> Self {
        Self::assemble(
            "Explicit midpoint",
            DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.5, 0.0]),
            DVector::from_vec(vec![0.0, 1.0]),
        )
    }

    /// Classical fourth-order scheme
    pub fn rk4() -> Self {
        #[rustfmt::skip]
        let a = DMatrix::from_row_slice(4, 4, &[
            0.0, 0.0, 0.0, 0.0,
            0.5, 0.0, 0.0, 0.0,
            0.0, 0.5, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
        ]);
        Self::assemble(
            "Runge-Kutta 4",
            a,
            DVector::from_vec(vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0]),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> usize {
        self.b.len()
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    pub fn c(&self) -> &DVector<f64> {
        &self.c
    }

    /// One step of size `h` from `(y, t)`
    pub(crate) fn step(&self, system: &dyn OdeSystem, y: &DVector<f64>, t: f64, h: f64) -> PieResult<DVector<f64>> {
        let s = self.stages();
        let mut slopes: Vec<DVector<f64>> = Vec::with_capacity(s);

        for j in 0..s {
            let mut stage = y.clone();
            for (k, slope) in slopes.iter().enumerate() {
                let a_jk = self.a[(j, k)];
                if a_jk != 0.0 {
                    stage.axpy(h * a_jk, slope, 1.0);
                }
            }
            slopes.push(system.rhs(&stage, t + self.c[j] * h)?);
        }

        let mut next = y.clone();
        for (b_j, slope) in self.b.iter().zip(&slopes) {
            if *b_j != 0.0 {
                next.axpy(h * b_j, slope, 1.0);
            }
        }
        Ok(next)
    }
}

impl fmt::Display for ButcherTableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} stages)", self.name, self.stages())
    }
}

// =================================================================================================
// Integrator
// =================================================================================================

/// Explicit Runge-Kutta integrator driven by a [`ButcherTableau`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitRungeKutta {
    tableau: ButcherTableau,
}

impl ExplicitRungeKutta {
    pub fn new(tableau: ButcherTableau) -> Self {
        Self { tableau }
    }

    pub fn euler() -> Self {
        Self::new(ButcherTableau::euler())
    }

    pub fn midpoint() -> Self {
        Self::new(ButcherTableau::midpoint())
    }

    pub fn rk4() -> Self {
        Self::new(ButcherTableau::rk4())
    }

    /// Preset of order 1, 2 or 4
    pub fn of_order(order: usize) -> PieResult<Self> {
        match order {
            1 => Ok(Self::euler()),
            2 => Ok(Self::midpoint()),
            4 => Ok(Self::rk4()),
            _ => Err(PieError::InvalidOrder {
                method: "Explicit Runge-Kutta",
                order,
            }),
        }
    }

    pub fn tableau(&self) -> &ButcherTableau {
        &self.tableau
    }
}

impl Solver for ExplicitRungeKutta {
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

        let mut state_trajectory = Vec::with_capacity(times.len());
        state_trajectory.push(y0.clone());
        let mut state = y0.clone();

        for (i, window) in times.windows(2).enumerate() {
            let (t, h) = (window[0], window[1] - window[0]);
            state = self.tableau.step(system, &state, t, h)?;
            validate_state(&state, i + 1, window[1])?;

            state_trajectory.push(state.clone());
            progress.report(i + 1, steps);
        }
        debug!("{}: {} steps on '{}'", self.tableau, steps, system.name());

        let mut result = SimulationResult::new(times.to_vec(), state_trajectory, state);
        result.add_metadata("solver", self.tableau.name());
        result.add_metadata("time steps", &steps.to_string());
        result.add_metadata("function evaluations", &(steps * self.tableau.stages()).to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        self.tableau.name()
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SilentProgress;
    use crate::system::OdeProblem;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn growth() -> OdeProblem {
        OdeProblem::new("growth", 1, |y, _t| y.clone())
    }

    fn error_at_one(solver: &ExplicitRungeKutta, h: f64) -> f64 {
        let grid = TimeGrid::with_step(0.0, 1.0, h).unwrap();
        let result = solver
            .advance(&growth(), &DVector::from_element(1, 1.0), &grid, &SilentProgress)
            .unwrap();
        (result.final_state[0] - 1.0_f64.exp()).abs()
    }

    #[test]
    fn test_presets_are_valid_tableaux() {
        for preset in [ButcherTableau::euler(), ButcherTableau::midpoint(), ButcherTableau::rk4()] {
            let rebuilt = ButcherTableau::new(preset.name(), preset.a().clone(), preset.b().clone());
            assert_eq!(rebuilt.unwrap(), preset);
        }
        assert_eq!(ButcherTableau::rk4().c().as_slice(), &[0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_nodes_are_row_sums() {
        // Ralston's second-order scheme
        let a = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 2.0 / 3.0, 0.0]);
        let b = DVector::from_vec(vec![0.25, 0.75]);
        let ralston = ButcherTableau::new("Ralston", a, b).unwrap();
        assert_eq!(ralston.c().as_slice(), &[0.0, 2.0 / 3.0]);

        // ẏ = 2t is integrated exactly, which needs the stage times right
        let ramp = OdeProblem::new("ramp", 1, |_y, t| DVector::from_element(1, 2.0 * t));
        let grid = TimeGrid::uniform(0.0, 1.0, 10).unwrap();
        let result = ExplicitRungeKutta::new(ralston)
            .advance(&ramp, &DVector::zeros(1), &grid, &SilentProgress)
            .unwrap();
        assert_relative_eq!(result.final_state[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_tableaux() {
        let implicit = ButcherTableau::new(
            "implicit",
            DMatrix::from_element(1, 1, 1.0),
            DVector::from_element(1, 1.0),
        );
        assert!(matches!(implicit, Err(PieError::InvalidTableau { .. })));

        let inconsistent = ButcherTableau::new("weights", DMatrix::zeros(2, 2), DVector::from_vec(vec![0.5, 0.4]));
        assert!(inconsistent.is_err());

        let shapes = ButcherTableau::new("shapes", DMatrix::zeros(2, 2), DVector::from_element(1, 1.0));
        assert!(shapes.is_err());

        assert!(ExplicitRungeKutta::of_order(3).is_err());
    }

    #[test]
    fn test_convergence_orders() {
        for (order, solver) in [(1, ExplicitRungeKutta::euler()), (2, ExplicitRungeKutta::midpoint()), (4, ExplicitRungeKutta::rk4())] {
            let coarse = error_at_one(&solver, 0.05);
            let fine = error_at_one(&solver, 0.025);
            let observed = (coarse / fine).log2();
            assert!(
                (observed - order as f64).abs() < 0.2,
                "order {order}: observed {observed}"
            );
        }
    }

    #[test]
    fn test_time_dependent_rhs() {
        // ẏ = 2t, exact for any scheme of order >= 2
        let problem = OdeProblem::new("ramp", 1, |_y, t| DVector::from_element(1, 2.0 * t));
        let grid = TimeGrid::uniform(0.0, 2.0, 7).unwrap();
        let result = ExplicitRungeKutta::midpoint()
            .advance(&problem, &DVector::zeros(1), &grid, &SilentProgress)
            .unwrap();
        assert_relative_eq!(result.final_state[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trajectory_and_progress() {
        let calls = Cell::new(0);
        let progress = |step: usize, total: usize| {
            assert!(step <= total);
            calls.set(calls.get() + 1);
        };
        let grid = TimeGrid::uniform(0.0, 1.0, 8).unwrap();
        let result = ExplicitRungeKutta::rk4()
            .advance(&growth(), &DVector::from_element(1, 1.0), &grid, &progress)
            .unwrap();

        assert_eq!(calls.get(), 8);
        assert_eq!(result.len(), 9);
        assert_eq!(result.time_points, grid.points());
        assert_eq!(result.state_trajectory[0][0], 1.0);
        assert_eq!(result.metadata.get("function evaluations").map(String::as_str), Some("32"));
    }

    #[test]
    fn test_blow_up_is_reported() {
        let stiff = OdeProblem::new("stiff", 1, |y, _t| y * -1000.0);
        let grid = TimeGrid::uniform(0.0, 1000.0, 10_000).unwrap();
        let result = ExplicitRungeKutta::euler().advance(&stiff, &DVector::from_element(1, 1.0), &grid, &SilentProgress);
        assert!(matches!(result, Err(PieError::NonFiniteState { .. })));
    }

    #[test]
    fn test_wrong_initial_length() {
        let grid = TimeGrid::uniform(0.0, 1.0, 2).unwrap();
        let result = ExplicitRungeKutta::euler().advance(&growth(), &DVector::zeros(2), &grid, &SilentProgress);
        assert!(matches!(result, Err(PieError::DimensionMismatch { .. })));
    }
}
