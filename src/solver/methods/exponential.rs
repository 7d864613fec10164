//! Exponential integrators
//!
//! # Augmented-matrix formulation
//!
//! Write the system as a linear part plus a remainder,
//! `ẏ = J_r y + N(y, t)`, and expand the remainder along the step as a
//! polynomial in the local time `τ`:
//!
//! ```text
//! N ≈ w1 + w2 τ + w3 τ²/2
//!
//! w1 = f - J_r y
//! w2 = (J - J_r) f + f_t
//! w3 = H[f, f] + (J - J_r)(J f + f_t) + 2 f_ty f + f_tt
//! ```
//!
//! where `J` is the Jacobian at the current state. Truncating after `p` terms
//! gives an order-`p` method. The truncated linear system is exactly
//! integrated by one exponential of the `(d + p)`-square matrix
//!
//! ```text
//!       ┌ J_r  w_p … w2  w1 ┐          ┌ y ┐
//!       │  0   0  1         │          │ 0 │
//!   M = │  0      0  ⋱      │      v = │ ⋮ │       y_{n+1} = [exp(hM) v]_{0..d}
//!       │  0          0  1  │          │ 0 │
//!       └  0              0 ┘          └ 1 ┘
//! ```
//!
//! # Variants
//!
//! | Variant                                | `J_r`                      |
//! |----------------------------------------|----------------------------|
//! | [`ExponentialVariant::Taylor`]         | `J(y0, t0)`, frozen        |
//! | [`ExponentialVariant::Rosenbrock`]     | `J(y_n, t_n)`, every step  |
//!
//! The Rosenbrock variant has `J = J_r`, so every drift term vanishes.
//!
//! The action `exp(hM) v` is computed densely, or with [`KrylovExpm`] once a
//! subspace dimension is configured.
//!
//! [`ExponentialEuler`] is the classical `φ₁` form of the order-1 method.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};
use crate::linalg::{expm_action, phi_1, KrylovExpm};
use crate::solver::traits::check_initial_state;
use crate::solver::{ProgressReporter, SimulationResult, Solver, TimeGrid, validate_state};
use crate::system::{Derivative, OdeSystem};

/// Highest supported order
pub const MAX_EXPONENTIAL_ORDER: usize = 3;

/// Relative difference below which two step sizes share a cached `φ₁(hJ)`
const STEP_REUSE_TOLERANCE: f64 = 1e-12;

// =================================================================================================
// Augmented exponential integrator
// =================================================================================================

/// Choice of the reference Jacobian `J_r`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExponentialVariant {
    /// Jacobian frozen at the initial state
    Taylor,

    /// Jacobian refreshed at every step
    Rosenbrock,
}

/// Exponential integrator of order 1 to 3
///
/// # Example
///
/// ```rust
/// use nalgebra::DVector;
/// use pie_rs::solver::{ExponentialIntegrator, ExponentialVariant, SilentProgress, Solver, TimeGrid};
/// use pie_rs::spatial::{Mesh, SpectralDifferenceOperator, SpatialOperator, Gaussian};
///
/// let mesh = Mesh::uniform(0.0, 1.0, 10).unwrap();
/// let op = SpectralDifferenceOperator::new(mesh, 3, 1.0, 0.01).unwrap();
/// let y0 = op.initial_state(&Gaussian { length: 1.0 });
///
/// let solver = ExponentialIntegrator::new(ExponentialVariant::Rosenbrock, 2)
///     .unwrap()
///     .with_krylov(20)
///     .unwrap();
/// let grid = TimeGrid::uniform(0.0, 0.1, 5).unwrap();
/// let result = solver.advance(&op, &y0, &grid, &SilentProgress).unwrap();
///
/// assert_eq!(result.len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialIntegrator {
    variant: ExponentialVariant,
    order: usize,
    krylov: Option<KrylovExpm>,
    name: String,
}

impl ExponentialIntegrator {
    /// Integrator with a dense matrix exponential
    pub fn new(variant: ExponentialVariant, order: usize) -> PieResult<Self> {
        if !(1..=MAX_EXPONENTIAL_ORDER).contains(&order) {
            return Err(PieError::InvalidOrder {
                method: "Exponential integrator",
                order,
            });
        }
        let name = match variant {
            ExponentialVariant::Taylor => format!("Exponential Taylor {order}"),
            ExponentialVariant::Rosenbrock => format!("Exponential Rosenbrock {order}"),
        };
        Ok(Self {
            variant,
            order,
            krylov: None,
            name,
        })
    }

    pub fn taylor(order: usize) -> PieResult<Self> {
        Self::new(ExponentialVariant::Taylor, order)
    }

    pub fn rosenbrock(order: usize) -> PieResult<Self> {
        Self::new(ExponentialVariant::Rosenbrock, order)
    }

    /// Compute the exponential action in a Krylov subspace of dimension `subspace_dim`
    pub fn with_krylov(self, subspace_dim: usize) -> PieResult<Self> {
        Ok(self.with_krylov_settings(KrylovExpm::new(subspace_dim)?))
    }

    pub fn with_krylov_settings(mut self, krylov: KrylovExpm) -> Self {
        self.krylov = Some(krylov);
        self
    }

    pub fn variant(&self) -> ExponentialVariant {
        self.variant
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn krylov(&self) -> Option<&KrylovExpm> {
        self.krylov.as_ref()
    }

    /// Correction columns `[w1, .., w_order]` at `(y, t)`
    fn corrections(
        &self,
        system: &dyn OdeSystem,
        y: &DVector<f64>,
        t: f64,
        jac: &DMatrix<f64>,
        jac_ref: &DMatrix<f64>,
    ) -> PieResult<Vec<DVector<f64>>> {
        let f = system.rhs(y, t)?;
        let mut columns = vec![&f - jac_ref * y];

        if self.order >= 2 {
            let drift = jac - jac_ref;
            let f_t = system.df_dt(y, t)?;
            columns.push(&drift * &f + &f_t);

            if self.order >= 3 {
                let hess = system.hess(y, t)?;
                let f_tt = system.d2f_dt2(y, t)?;
                let f_ty = system.d2f_dtdy(y, t)?;
                let jf = jac * &f + &f_t;
                columns.push(hess.contract(&f, &f)? + &drift * jf + (f_ty * &f) * 2.0 + f_tt);
            }
        }

        Ok(columns)
    }

    /// `exp(hM) v`
    fn exponential_action(&self, m: &DMatrix<f64>, v: &DVector<f64>) -> PieResult<DVector<f64>> {
        match &self.krylov {
            Some(krylov) => krylov.apply(m, v),
            None => expm_action(m, v),
        }
    }
}

/// `(d + p)`-square matrix with `J_r` in the top-left block, `columns[k]` in
/// column `d + p - 1 - k` and a unit superdiagonal chaining the extra rows
pub(crate) fn augmented_matrix(jac_ref: &DMatrix<f64>, columns: &[DVector<f64>]) -> DMatrix<f64> {
    let d = jac_ref.nrows();
    let p = columns.len();
    let size = d + p;

    let mut m = DMatrix::zeros(size, size);
    m.view_mut((0, 0), (d, d)).copy_from(jac_ref);
    for (k, w) in columns.iter().enumerate() {
        m.view_mut((0, size - 1 - k), (d, 1)).copy_from(w);
    }
    for k in 0..p.saturating_sub(1) {
        m[(d + k, d + k + 1)] = 1.0;
    }
    m
}

/// `(y, 0, …, 0, 1)`
pub(crate) fn augmented_vector(y: &DVector<f64>, extra: usize) -> DVector<f64> {
    let d = y.len();
    let mut v = DVector::zeros(d + extra);
    v.rows_mut(0, d).copy_from(y);
    if extra > 0 {
        v[d + extra - 1] = 1.0;
    }
    v
}

impl Solver for ExponentialIntegrator {
    fn advance(
        &self,
        system: &dyn OdeSystem,
        y0: &DVector<f64>,
        grid: &TimeGrid,
        progress: &dyn ProgressReporter,
    ) -> PieResult<SimulationResult> {
        check_initial_state(system, y0, grid.start())?;
        if !system.provides_jacobian() {
            return Err(system.missing(Derivative::Jacobian));
        }
        if self.order >= 3 && !system.provides_hessian() {
            return Err(system.missing(Derivative::Hessian));
        }

        let times = grid.points();
        let steps = grid.steps();
        let d = system.dim();

        let frozen = match self.variant {
            ExponentialVariant::Taylor => Some(system.jac(y0, grid.start())?),
            ExponentialVariant::Rosenbrock => None,
        };

        let mut state_trajectory = Vec::with_capacity(times.len());
        state_trajectory.push(y0.clone());
        let mut state = y0.clone();

        for (i, window) in times.windows(2).enumerate() {
            let (t, h) = (window[0], window[1] - window[0]);

            let jac = system.jac(&state, t)?;
            let jac_ref = frozen.as_ref().unwrap_or(&jac);

            let columns = self.corrections(system, &state, t, &jac, jac_ref)?;
            let m = augmented_matrix(jac_ref, &columns) * h;
            let v = augmented_vector(&state, self.order);

            state = self.exponential_action(&m, &v)?.rows(0, d).into_owned();
            validate_state(&state, i + 1, window[1])?;

            state_trajectory.push(state.clone());
            progress.report(i + 1, steps);
        }
        debug!("{}: {} steps on '{}' (d = {})", self.name, steps, system.name(), d);

        let mut result = SimulationResult::new(times.to_vec(), state_trajectory, state);
        result.add_metadata("solver", &self.name);
        result.add_metadata("time steps", &steps.to_string());
        result.add_metadata("augmented dimension", &(d + self.order).to_string());
        match &self.krylov {
            Some(krylov) => result.add_metadata("exponential", &format!("krylov (k = {})", krylov.subspace_dim())),
            None => result.add_metadata("exponential", "dense"),
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =================================================================================================
// Exponential Euler
// =================================================================================================

/// `y_{n+1} = y_n + h φ₁(hJ) f(y_n, t_n)`
///
/// With a frozen Jacobian `J = J(y0, t0)`; with `refresh_jacobian` it is
/// re-evaluated at every step (exponential Rosenbrock-Euler). `φ₁(hJ)` is
/// reused while neither `h` nor `J` change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExponentialEuler {
    refresh_jacobian: bool,
}

impl ExponentialEuler {
    pub fn frozen() -> Self {
        Self { refresh_jacobian: false }
    }

    pub fn rosenbrock() -> Self {
        Self { refresh_jacobian: true }
    }

    pub fn refreshes_jacobian(&self) -> bool {
        self.refresh_jacobian
    }
}

impl Solver for ExponentialEuler {
    fn advance(
        &self,
        system: &dyn OdeSystem,
        y0: &DVector<f64>,
        grid: &TimeGrid,
        progress: &dyn ProgressReporter,
    ) -> PieResult<SimulationResult> {
        check_initial_state(system, y0, grid.start())?;
        if !system.provides_jacobian() {
            return Err(system.missing(Derivative::Jacobian));
        }

        let times = grid.points();
        let steps = grid.steps();

        let mut jac = system.jac(y0, grid.start())?;
        let mut cached: Option<(f64, DMatrix<f64>)> = None;
        let mut phi_evaluations = 0usize;

        let mut state_trajectory = Vec::with_capacity(times.len());
        state_trajectory.push(y0.clone());
        let mut state = y0.clone();

        for (i, window) in times.windows(2).enumerate() {
            let (t, h) = (window[0], window[1] - window[0]);

            if self.refresh_jacobian && i > 0 {
                let refreshed = system.jac(&state, t)?;
                if refreshed != jac {
                    jac = refreshed;
                    cached = None;
                }
            }
            let phi = match cached.take() {
                Some((cached_h, phi)) if (cached_h - h).abs() <= STEP_REUSE_TOLERANCE * h => phi,
                _ => {
                    phi_evaluations += 1;
                    phi_1(&(&jac * h))?
                }
            };

            let f = system.rhs(&state, t)?;
            state += &phi * f * h;
            cached = Some((h, phi));

            validate_state(&state, i + 1, window[1])?;
            state_trajectory.push(state.clone());
            progress.report(i + 1, steps);
        }
        debug!("{}: {} φ₁ evaluations over {} steps", self.name(), phi_evaluations, steps);

        let mut result = SimulationResult::new(times.to_vec(), state_trajectory, state);
        result.add_metadata("solver", self.name());
        result.add_metadata("time steps", &steps.to_string());
        result.add_metadata("phi evaluations", &phi_evaluations.to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        if self.refresh_jacobian {
            "Exponential Rosenbrock-Euler"
        } else {
            "Exponential Euler"
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
