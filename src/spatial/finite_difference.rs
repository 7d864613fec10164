//! Finite-difference operator for linear advection-diffusion
//!
//! # Discretisation
//!
//! On the periodic, possibly non-uniform point set `x_0 < … < x_{n-1}` with
//! `Δ⁻_i = x_i - x_{i-1}` and `Δ⁺_i = x_{i+1} - x_i` (indices wrap, `x_{-1} =
//! x_{n-1} - L`):
//!
//! ```text
//! ∂y/∂x  ≈ (y_i - y_{i-1}) / Δ⁻_i              c > 0  (upwind)
//! ∂y/∂x  ≈ (y_{i+1} - y_i) / Δ⁺_i              c ≤ 0
//! ∂²y/∂x² ≈ 2 / (Δ⁻_i + Δ⁺_i) · ((y_{i+1} - y_i)/Δ⁺_i - (y_i - y_{i-1})/Δ⁻_i)
//! ```
//!
//! and `ẏ = -c ∂y/∂x + d ∂²y/∂x²`. The scheme is linear in `y`, so the
//! Jacobian (tridiagonal with periodic corners) is assembled once and
//! `rhs(y) = J · y`.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use num::integer::mod_floor;

use crate::error::PieResult;
use crate::spatial::{Mesh, SolutionPointLayout, SpatialOperator};
use crate::system::{Hessian, OdeSystem};

// =================================================================================================
// Periodic stencil
// =================================================================================================

/// One-sided spacings of a periodic point set, shared with the Burgers variant
#[derive(Debug, Clone)]
pub(crate) struct PeriodicStencil {
    /// `Δ⁻_i = x_i - x_{i-1}`
    backward: Vec<f64>,

    /// `Δ⁺_i = x_{i+1} - x_i`
    forward: Vec<f64>,
}

impl PeriodicStencil {
    pub(crate) fn new(layout: &SolutionPointLayout) -> Self {
        let x = layout.coordinates();
        let n = x.len();
        let length = layout.mesh().length();

        let forward: Vec<f64> = (0..n)
            .map(|i| if i + 1 < n { x[i + 1] - x[i] } else { x[0] + length - x[i] })
            .collect();
        let backward: Vec<f64> = (0..n).map(|i| forward[previous(i, n)]).collect();

        Self { backward, forward }
    }

    pub(crate) fn len(&self) -> usize {
        self.forward.len()
    }

    /// `w_i = (Δ⁻_i + Δ⁺_i) / 2`, the width of the dual cell around `x_i`
    pub(crate) fn dual_width(&self, i: usize) -> f64 {
        0.5 * (self.backward[i] + self.forward[i])
    }

    /// Backward difference `(y_i - y_{i-1}) / Δ⁻_i`
    pub(crate) fn backward_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut j = DMatrix::zeros(n, n);
        for i in 0..n {
            j[(i, i)] += 1.0 / self.backward[i];
            j[(i, previous(i, n))] -= 1.0 / self.backward[i];
        }
        j
    }

    /// Forward difference `(y_{i+1} - y_i) / Δ⁺_i`
    pub(crate) fn forward_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut j = DMatrix::zeros(n, n);
        for i in 0..n {
            j[(i, i)] -= 1.0 / self.forward[i];
            j[(i, next(i, n))] += 1.0 / self.forward[i];
        }
        j
    }

    /// Centered second derivative `2 (J⁺ - J⁻) / (Δ⁻ + Δ⁺)`, row-scaled
    pub(crate) fn second_derivative_matrix(&self) -> DMatrix<f64> {
        let mut j = self.forward_matrix() - self.backward_matrix();
        for (i, mut row) in j.row_iter_mut().enumerate() {
            row *= 1.0 / self.dual_width(i);
        }
        j
    }
}

pub(crate) fn previous(i: usize, n: usize) -> usize {
    mod_floor(i as isize - 1, n as isize) as usize
}

pub(crate) fn next(i: usize, n: usize) -> usize {
    mod_floor(i as isize + 1, n as isize) as usize
}

// =================================================================================================
// Operator
// =================================================================================================

/// Upwind finite-difference advection-diffusion operator
///
/// # Example
///
/// ```rust
/// use nalgebra::DVector;
/// use pie_rs::spatial::{FiniteDifferenceOperator, Mesh};
/// use pie_rs::system::OdeSystem;
///
/// let mesh = Mesh::uniform(0.0, 1.0, 10).unwrap();
/// let op = FiniteDifferenceOperator::new(mesh, 1, 1.0, 0.0).unwrap();
///
/// // Constants are steady
/// let y = DVector::from_element(10, 3.0);
/// assert!(op.rhs(&y, 0.0).unwrap().norm() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FiniteDifferenceOperator {
    layout: SolutionPointLayout,
    convection: f64,
    diffusion: f64,
    jacobian: DMatrix<f64>,
}

impl FiniteDifferenceOperator {
    /// Build the operator and its constant Jacobian
    ///
    /// # Errors
    ///
    /// `InvalidPointCount` when `points_per_cell == 0`.
    pub fn new(mesh: Mesh, points_per_cell: usize, convection: f64, diffusion: f64) -> PieResult<Self> {
        let layout = SolutionPointLayout::new(mesh, points_per_cell)?;
        let stencil = PeriodicStencil::new(&layout);

        let upwind = if convection < 0.0 {
            stencil.forward_matrix()
        } else {
            stencil.backward_matrix()
        };
        let jacobian = upwind * -convection + stencil.second_derivative_matrix() * diffusion;

        Ok(Self {
            layout,
            convection,
            diffusion,
            jacobian,
        })
    }

    /// Advection speed `c`
    pub fn convection(&self) -> f64 {
        self.convection
    }

    /// Constant Jacobian
    pub fn jacobian(&self) -> &DMatrix<f64> {
        &self.jacobian
    }
}

impl OdeSystem for FiniteDifferenceOperator {
    fn dim(&self) -> usize {
        self.layout.n_points()
    }

    fn rhs(&self, y: &DVector<f64>, _t: f64) -> PieResult<DVector<f64>> {
        self.check_state(y)?;
        Ok(&self.jacobian * y)
    }

    fn provides_jacobian(&self) -> bool {
        true
    }

    fn jac(&self, y: &DVector<f64>, _t: f64) -> PieResult<DMatrix<f64>> {
        self.check_state(y)?;
        Ok(self.jacobian.clone())
    }

    fn provides_hessian(&self) -> bool {
        true
    }

    fn hess(&self, y: &DVector<f64>, _t: f64) -> PieResult<Hessian> {
        self.check_state(y)?;
        Ok(Hessian::zeros(self.dim()))
    }

    fn name(&self) -> &str {
        "Finite difference"
    }
}

impl SpatialOperator for FiniteDifferenceOperator {
    fn layout(&self) -> &SolutionPointLayout {
        &self.layout
    }

    fn diffusion(&self) -> f64 {
        self.diffusion
    }
}

impl fmt::Display for FiniteDifferenceOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (c = {}, d = {}) {}", self.name(), self.convection, self.diffusion, self.layout)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
