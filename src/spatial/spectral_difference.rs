//! Spectral-difference operator for linear advection-diffusion
//!
//! # Discretisation
//!
//! Every cell carries `p` solution points (Chebyshev-Gauss) and `p + 1` flux
//! points (`-1`, the roots of `P_{p-1}`, `1`). Per cell, with `s = 2 / width`:
//!
//! - `S`  (`(p+1) × p`): solution → flux point extrapolation
//! - `D_f` (`(p+1) × (p+1)`): differentiation in the flux point basis, times `s`
//! - `F·D_f` (`p × (p+1)`): derivative of flux values, taken back to solution points, times `s`
//!
//! Neighbouring cells share an interface: the first flux point `a` of cell `i`
//! and the last flux point `b` of cell `i - 1`. Coupling matrices act on the
//! full flux vector:
//!
//! - `R_c` copies the upstream value onto the downstream node (sign of `c`)
//! - `R_d` replaces both values by their mean
//!
//! ```text
//! J = (F·D_f) · (-c R_c S + d R_d D_f R_d S)
//! ```
//!
//! All full-size matrices are block diagonal and assembled once; the scheme
//! is linear, so `rhs(y) = J · y`.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::error::PieResult;
use crate::linalg::{block_diagonal, derivative_matrix, extrapolation_matrix, flux_points};
use crate::spatial::{Mesh, SolutionPointLayout, SpatialOperator};
use crate::system::{Hessian, OdeSystem};

// =================================================================================================
// Shared matrices
// =================================================================================================

/// Full-size spectral-difference matrices, shared with the Burgers variant
#[derive(Debug, Clone)]
pub(crate) struct SpectralMatrices {
    /// Reference flux points in `[-1, 1]`
    pub(crate) flux_points: Vec<f64>,

    /// Block-diagonal `S`, `N_f × n`
    pub(crate) sol_to_flux: DMatrix<f64>,

    /// Block-diagonal scaled `D_f`, `N_f × N_f`
    pub(crate) flux_derivative: DMatrix<f64>,

    /// Block-diagonal scaled `F · D_f`, `n × N_f`
    pub(crate) flux_derivative_to_sol: DMatrix<f64>,

    /// Interface averaging `R_d`, `N_f × N_f`
    pub(crate) averaging: DMatrix<f64>,

    /// Flux points per cell (`p + 1`)
    pub(crate) stride: usize,
}

impl SpectralMatrices {
    pub(crate) fn new(layout: &SolutionPointLayout) -> PieResult<Self> {
        let mesh = layout.mesh();
        let p = layout.points_per_cell();
        let flux_points = flux_points(p);

        let sol_to_flux = extrapolation_matrix(layout.reference_points(), &flux_points)?;
        let flux_to_sol = extrapolation_matrix(&flux_points, layout.reference_points())?;
        let d_flux = derivative_matrix(&flux_points)?;
        let d_flux_to_sol = &flux_to_sol * &d_flux;

        let n_cells = mesh.n_cells();
        let scales: Vec<f64> = (0..n_cells).map(|i| 2.0 / mesh.cell_width(i)).collect();

        let sol_to_flux_full = block_diagonal(&vec![sol_to_flux; n_cells]);
        let flux_derivative =
            block_diagonal(&scales.iter().map(|s| &d_flux * *s).collect::<Vec<_>>());
        let flux_derivative_to_sol =
            block_diagonal(&scales.iter().map(|s| &d_flux_to_sol * *s).collect::<Vec<_>>());

        let mut matrices = Self {
            flux_points,
            sol_to_flux: sol_to_flux_full,
            flux_derivative,
            flux_derivative_to_sol,
            averaging: DMatrix::zeros(0, 0),
            stride: p + 1,
        };

        let n_flux = matrices.n_flux();
        let mut averaging = DMatrix::identity(n_flux, n_flux);
        for (a, b) in matrices.interfaces(n_cells) {
            averaging[(a, a)] = 0.5;
            averaging[(a, b)] = 0.5;
            averaging[(b, a)] = 0.5;
            averaging[(b, b)] = 0.5;
        }
        matrices.averaging = averaging;

        Ok(matrices)
    }

    /// Total number of flux points `N_f`
    pub(crate) fn n_flux(&self) -> usize {
        self.sol_to_flux.nrows()
    }

    /// `(a, b)` per interface: first flux point of cell `i`, last of cell `i - 1`
    pub(crate) fn interfaces(&self, n_cells: usize) -> impl Iterator<Item = (usize, usize)> {
        let stride = self.stride;
        let n_flux = self.n_flux();
        (0..n_cells).map(move |i| {
            let a = i * stride;
            (a, (a + n_flux - 1) % n_flux)
        })
    }

    /// Diffusive Jacobian `d · (F·D_f) R_d D_f R_d S`
    pub(crate) fn diffusion_jacobian(&self, diffusion: f64) -> DMatrix<f64> {
        &self.flux_derivative_to_sol
            * (&self.averaging * &self.flux_derivative * &self.averaging * &self.sol_to_flux)
            * diffusion
    }
}

// =================================================================================================
// Operator
// =================================================================================================

/// Spectral-difference advection-diffusion operator
///
/// # Example
///
/// ```rust
/// use nalgebra::DVector;
/// use pie_rs::spatial::{Mesh, SpectralDifferenceOperator, SpatialOperator};
/// use pie_rs::system::OdeSystem;
///
/// let mesh = Mesh::uniform(0.0, 1.0, 8).unwrap();
/// let op = SpectralDifferenceOperator::new(mesh, 3, 1.0, 0.01).unwrap();
///
/// assert_eq!(op.dim(), 24);
/// assert_eq!(op.flux_points().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct SpectralDifferenceOperator {
    layout: SolutionPointLayout,
    convection: f64,
    diffusion: f64,
    flux_points: Vec<f64>,
    jacobian: DMatrix<f64>,
}

impl SpectralDifferenceOperator {
    /// Build the operator and its constant Jacobian
    ///
    /// # Errors
    ///
    /// `InvalidPointCount` when `points_per_cell == 0`.
    pub fn new(mesh: Mesh, points_per_cell: usize, convection: f64, diffusion: f64) -> PieResult<Self> {
        let layout = SolutionPointLayout::new(mesh, points_per_cell)?;
        let matrices = SpectralMatrices::new(&layout)?;

        let n_flux = matrices.n_flux();
        let mut upwind = DMatrix::identity(n_flux, n_flux);
        for (a, b) in matrices.interfaces(layout.mesh().n_cells()) {
            if convection > 0.0 {
                upwind[(a, a)] = 0.0;
                upwind[(a, b)] = 1.0;
            } else {
                upwind[(b, b)] = 0.0;
                upwind[(b, a)] = 1.0;
            }
        }

        let convective = &matrices.flux_derivative_to_sol * (upwind * &matrices.sol_to_flux) * -convection;
        let jacobian = convective + matrices.diffusion_jacobian(diffusion);

        Ok(Self {
            layout,
            convection,
            diffusion,
            flux_points: matrices.flux_points,
            jacobian,
        })
    }

    /// Advection speed `c`
    pub fn convection(&self) -> f64 {
        self.convection
    }

    /// Reference flux points in `[-1, 1]`
    pub fn flux_points(&self) -> &[f64] {
        &self.flux_points
    }

    /// Constant Jacobian
    pub fn jacobian(&self) -> &DMatrix<f64> {
        &self.jacobian
    }
}

impl OdeSystem for SpectralDifferenceOperator {
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
        "Spectral difference"
    }
}

impl SpatialOperator for SpectralDifferenceOperator {
    fn layout(&self) -> &SolutionPointLayout {
        &self.layout
    }

    fn diffusion(&self) -> f64 {
        self.diffusion
    }
}

impl fmt::Display for SpectralDifferenceOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (c = {}, d = {}) {}", self.name(), self.convection, self.diffusion, self.layout)?;
        let points: Vec<String> = self.flux_points.iter().map(|x| format!("{x:.2}")).collect();
        write!(f, "\nflux points [-1, 1]: {}", points.join("   "))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
