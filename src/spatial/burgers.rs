//! Viscous Burgers operators
//!
//! `ẏ = -∂_x (y²/2) + d ∂²y/∂x²` on a periodic domain. Both variants couple
//! neighbouring values through the Godunov selection of [`riemann`](super::riemann),
//! recomputed from the current state at every call. The selection is
//! piecewise constant in `y`, so `jac` and `hess` are exact only where it does
//! not switch; across a switch they are one-sided derivatives.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use ndarray::Array3;

use crate::error::PieResult;
use crate::spatial::finite_difference::{next, previous, PeriodicStencil};
use crate::spatial::riemann::{upwind_side, Upwind};
use crate::spatial::spectral_difference::SpectralMatrices;
use crate::spatial::{Mesh, SolutionPointLayout, SpatialOperator};
use crate::system::{Hessian, OdeSystem};

// =================================================================================================
// Finite difference
// =================================================================================================

/// Conservative finite-difference Burgers operator
///
/// With the dual width `w_i = (Δ⁻_i + Δ⁺_i)/2` and the interface state
/// `u*_{i+1/2} = Godunov(y_i, y_{i+1})`:
///
/// ```text
/// rhs_i = (F_{i+1/2} - F_{i-1/2}) / w_i + d (D₂ y)_i        F = -(u*)²/2
/// ```
///
/// so that `Σ w_i rhs_i = 0` (mass is conserved).
#[derive(Debug, Clone)]
pub struct FiniteDifferenceBurgers {
    layout: SolutionPointLayout,
    diffusion: f64,
    stencil: PeriodicStencil,
    diffusion_jacobian: DMatrix<f64>,
}

/// Interface `i + 1/2` between points `i` and `i + 1`
struct Interface {
    state: f64,

    /// Index of the point supplying the state, `None` when sonic
    source: Option<usize>,
}

impl FiniteDifferenceBurgers {
    /// Build the operator and its constant diffusive Jacobian
    ///
    /// # Errors
    ///
    /// `InvalidPointCount` when `points_per_cell == 0`.
    pub fn new(mesh: Mesh, points_per_cell: usize, diffusion: f64) -> PieResult<Self> {
        let layout = SolutionPointLayout::new(mesh, points_per_cell)?;
        let stencil = PeriodicStencil::new(&layout);
        let diffusion_jacobian = stencil.second_derivative_matrix() * diffusion;

        Ok(Self {
            layout,
            diffusion,
            stencil,
            diffusion_jacobian,
        })
    }

    /// Godunov selection at every interface `i + 1/2`
    fn interfaces(&self, y: &DVector<f64>) -> Vec<Interface> {
        let n = y.len();
        (0..n)
            .map(|i| {
                let right = next(i, n);
                let side = upwind_side(y[i], y[right]);
                let source = match side {
                    Upwind::Left => Some(i),
                    Upwind::Right => Some(right),
                    Upwind::Sonic => None,
                };
                Interface {
                    state: side.state(y[i], y[right]),
                    source,
                }
            })
            .collect()
    }
}

impl OdeSystem for FiniteDifferenceBurgers {
    fn dim(&self) -> usize {
        self.layout.n_points()
    }

    fn rhs(&self, y: &DVector<f64>, _t: f64) -> PieResult<DVector<f64>> {
        self.check_state(y)?;
        let n = y.len();
        let interfaces = self.interfaces(y);
        let flux = |k: usize| -0.5 * interfaces[k].state * interfaces[k].state;

        let convective = DVector::from_fn(n, |i, _| {
            (flux(i) - flux(previous(i, n))) / self.stencil.dual_width(i)
        });
        Ok(convective + &self.diffusion_jacobian * y)
    }

    fn provides_jacobian(&self) -> bool {
        true
    }

    fn jac(&self, y: &DVector<f64>, _t: f64) -> PieResult<DMatrix<f64>> {
        self.check_state(y)?;
        let n = y.len();
        let interfaces = self.interfaces(y);
        let mut jac = self.diffusion_jacobian.clone();

        for i in 0..n {
            let w = self.stencil.dual_width(i);
            // dF/du* = -u*, du*/dy_source = 1
            let outgoing = &interfaces[i];
            if let Some(s) = outgoing.source {
                jac[(i, s)] -= outgoing.state / w;
            }
            let incoming = &interfaces[previous(i, n)];
            if let Some(s) = incoming.source {
                jac[(i, s)] += incoming.state / w;
            }
        }
        Ok(jac)
    }

    fn provides_hessian(&self) -> bool {
        true
    }

    /// Only entries `H[i, s, s]` are nonzero, but the tensor is
    /// stored dense: every call allocates `8n³` bytes (8 MB at n = 100).
    fn hess(&self, y: &DVector<f64>, _t: f64) -> PieResult<Hessian> {
        self.check_state(y)?;
        let n = y.len();
        let interfaces = self.interfaces(y);
        let mut tensor = Array3::zeros((n, n, n));

        for i in 0..n {
            let w = self.stencil.dual_width(i);
            if let Some(s) = interfaces[i].source {
                tensor[[i, s, s]] -= 1.0 / w;
            }
            if let Some(s) = interfaces[previous(i, n)].source {
                tensor[[i, s, s]] += 1.0 / w;
            }
        }
        Hessian::from_tensor(tensor)
    }

    fn name(&self) -> &str {
        "Finite difference for Burgers' equation"
    }
}

impl SpatialOperator for FiniteDifferenceBurgers {
    fn layout(&self) -> &SolutionPointLayout {
        &self.layout
    }

    fn diffusion(&self) -> f64 {
        self.diffusion
    }
}

impl fmt::Display for FiniteDifferenceBurgers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (d = {}) {}", self.name(), self.diffusion, self.layout)
    }
}

// =================================================================================================
// Spectral difference
// =================================================================================================

/// Spectral-difference Burgers operator
///
/// With `u = G(y) · y` the flux-point values after the interface selection
/// (`G = R(y) S`, rows of `S` copied or zeroed per interface):
///
/// ```text
/// rhs  = (F·D_f) · (-u²/2) + J_d · y
/// jac  = J_d - (F·D_f) · diag(u) · G
/// hess[i, j, k] = -Σ_m (F·D_f)[i, m] G[m, j] G[m, k]
/// ```
///
/// `J_d` is the constant diffusive Jacobian of the linear variant.
#[derive(Debug, Clone)]
pub struct SpectralDifferenceBurgers {
    layout: SolutionPointLayout,
    diffusion: f64,
    matrices: SpectralMatrices,
    diffusion_jacobian: DMatrix<f64>,
}

impl SpectralDifferenceBurgers {
    /// Build the operator and its constant diffusive Jacobian
    ///
    /// # Errors
    ///
    /// `InvalidPointCount` when `points_per_cell == 0`.
    pub fn new(mesh: Mesh, points_per_cell: usize, diffusion: f64) -> PieResult<Self> {
        let layout = SolutionPointLayout::new(mesh, points_per_cell)?;
        let matrices = SpectralMatrices::new(&layout)?;
        let diffusion_jacobian = matrices.diffusion_jacobian(diffusion);

        Ok(Self {
            layout,
            diffusion,
            matrices,
            diffusion_jacobian,
        })
    }

    /// Reference flux points in `[-1, 1]`
    pub fn flux_points(&self) -> &[f64] {
        &self.matrices.flux_points
    }

    /// Selection matrix `G(y) = R(y) S`, `N_f × n`
    fn continuity(&self, y: &DVector<f64>) -> DMatrix<f64> {
        let s = &self.matrices.sol_to_flux;
        let y_flux = s * y;
        let mut g = s.clone();

        for (a, b) in self.matrices.interfaces(self.layout.mesh().n_cells()) {
            match upwind_side(y_flux[b], y_flux[a]) {
                Upwind::Left => g.set_row(a, &s.row(b)),
                Upwind::Right => g.set_row(b, &s.row(a)),
                Upwind::Sonic => {
                    g.row_mut(a).fill(0.0);
                    g.row_mut(b).fill(0.0);
                }
            }
        }
        g
    }
}

impl OdeSystem for SpectralDifferenceBurgers {
    fn dim(&self) -> usize {
        self.layout.n_points()
    }

    fn rhs(&self, y: &DVector<f64>, _t: f64) -> PieResult<DVector<f64>> {
        self.check_state(y)?;
        let u = self.continuity(y) * y;
        let flux = u.map(|v| -0.5 * v * v);
        Ok(&self.matrices.flux_derivative_to_sol * flux + &self.diffusion_jacobian * y)
    }

    fn provides_jacobian(&self) -> bool {
        true
    }

    fn jac(&self, y: &DVector<f64>, _t: f64) -> PieResult<DMatrix<f64>> {
        self.check_state(y)?;
        let mut g = self.continuity(y);
        let u = &g * y;
        for (m, mut row) in g.row_iter_mut().enumerate() {
            row *= u[m];
        }
        Ok(&self.diffusion_jacobian - &self.matrices.flux_derivative_to_sol * g)
    }

    fn provides_hessian(&self) -> bool {
        true
    }

    /// Dense `n × n × n` tensor: every call allocates `8n³` bytes, which
    /// only the order-3 exponential integrators pay for.
    fn hess(&self, y: &DVector<f64>, _t: f64) -> PieResult<Hessian> {
        self.check_state(y)?;
        let n = y.len();
        let g = self.continuity(y);
        let to_sol = &self.matrices.flux_derivative_to_sol;
        let mut tensor = Array3::zeros((n, n, n));

        for m in 0..g.nrows() {
            let support: Vec<(usize, f64)> = g
                .row(m)
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(|(j, v)| (j, *v))
                .collect();
            if support.is_empty() {
                continue;
            }
            for i in 0..n {
                let c = to_sol[(i, m)];
                if c == 0.0 {
                    continue;
                }
                for &(j, gj) in &support {
                    for &(k, gk) in &support {
                        tensor[[i, j, k]] -= c * gj * gk;
                    }
                }
            }
        }
        Hessian::from_tensor(tensor)
    }

    fn name(&self) -> &str {
        "Spectral difference for Burgers' equation"
    }
}

impl SpatialOperator for SpectralDifferenceBurgers {
    fn layout(&self) -> &SolutionPointLayout {
        &self.layout
    }

    fn diffusion(&self) -> f64 {
        self.diffusion
    }
}

impl fmt::Display for SpectralDifferenceBurgers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (d = {}) {}", self.name(), self.diffusion, self.layout)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
