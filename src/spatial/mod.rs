//! Spatial operators
//!
//! A spatial operator turns the periodic 1D PDE
//!
//! ```text
//! ∂y/∂t = -c ∂y/∂x + d ∂²y/∂x²          (advection-diffusion)
//! ∂y/∂t = -∂(y²/2)/∂x + d ∂²y/∂x²        (viscous Burgers)
//! ```
//!
//! into the ODE system `ẏ = rhs(y, t)` on the solution points of a mesh
//! (method of lines). Every operator is an [`OdeSystem`] of dimension
//! `n = p · n_cells`, so any temporal integrator can advance it.
//!
//! # Available Operators
//!
//! | Operator                        | Equation               | Jacobian           | Hessian     |
//! |---------------------------------|------------------------|--------------------|-------------|
//! | [`FiniteDifferenceOperator`]    | advection-diffusion    | constant           | zero        |
//! | [`SpectralDifferenceOperator`]  | advection-diffusion    | constant           | zero        |
//! | [`FiniteDifferenceBurgers`]     | viscous Burgers        | per call           | per call    |
//! | [`SpectralDifferenceBurgers`]   | viscous Burgers        | per call           | per call    |
//!
//! # Example
//!
//! ```rust
//! use pie_rs::spatial::{Mesh, SpectralDifferenceOperator, SpatialOperator, Sine, InitialCondition};
//! use pie_rs::system::OdeSystem;
//!
//! let mesh = Mesh::uniform(0.0, 1.0, 20).unwrap();
//! let op = SpectralDifferenceOperator::new(mesh, 3, 1.0, 0.0).unwrap();
//!
//! let y0 = Sine { length: 1.0, periods: 1 }.sample(op.coordinates());
//! let dy = op.rhs(&y0, 0.0).unwrap();
//! assert_eq!(dy.len(), 60);
//! ```

pub mod burgers;
pub mod finite_difference;
pub mod initial_condition;
pub mod mesh;
pub mod riemann;
pub mod spectral_difference;

pub use burgers::{FiniteDifferenceBurgers, SpectralDifferenceBurgers};
pub use finite_difference::FiniteDifferenceOperator;
pub use initial_condition::{Gaussian, InitialCondition, Rectangle, Sine, TrimmedSine};
pub use mesh::{Mesh, SolutionPointLayout};
pub use riemann::{interface_flux, interface_state, upwind_side, Upwind};
pub use spectral_difference::SpectralDifferenceOperator;

use nalgebra::DVector;

use crate::error::PieResult;
use crate::system::OdeSystem;

/// Common surface of the spatial operators
pub trait SpatialOperator: OdeSystem {
    /// Solution points
    fn layout(&self) -> &SolutionPointLayout;

    /// Diffusion coefficient `d`
    fn diffusion(&self) -> f64;

    /// Mesh the operator was built on
    fn mesh(&self) -> &Mesh {
        self.layout().mesh()
    }

    /// Coordinates of the solution points
    fn coordinates(&self) -> &[f64] {
        self.layout().coordinates()
    }

    /// Number of solution points, the dimension of the ODE system
    fn n_points(&self) -> usize {
        self.layout().n_points()
    }

    /// CFL number of a step `dt` at characteristic speed `speed`
    fn cfl_number(&self, speed: f64, dt: f64) -> f64 {
        self.layout().cfl_number(speed, self.diffusion(), dt)
    }

    /// Time step matching the CFL number `cfl` at characteristic speed `speed`
    fn time_step(&self, cfl: f64, speed: f64) -> PieResult<f64> {
        self.layout().time_step(cfl, speed, self.diffusion())
    }

    /// Sample an initial condition on the solution points
    fn initial_state(&self, condition: &dyn InitialCondition) -> DVector<f64> {
        condition.sample(self.coordinates())
    }
}
