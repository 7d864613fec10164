//! pie-rs: method-of-lines engine for periodic 1D transport problems
//!
//! Spatial operators turn the periodic advection-diffusion and viscous Burgers
//! equations into ODE systems; temporal integrators advance those systems.
//!
//! # Architecture
//!
//! pie-rs is built on two core principles:
//!
//! 1. **Separation of Space and Time**
//!    - Spatial operators define the semi-discrete system (what to solve)
//!    - Temporal integrators provide methods (how to solve)
//!
//! 2. **Explicit Contracts**
//!    - Every operator is an [`OdeSystem`](system::OdeSystem) exposing
//!      `rhs`, and when available `jac` and `hess`
//!    - Missing derivatives are reported, never silently zero
//!    - Every failure is a typed [`PieError`](error::PieError)
//!
//! # Quick Start
//!
//! ```rust
//! use pie_rs::prelude::*;
//!
//! # fn main() -> PieResult<()> {
//! // 1. Spatial operator and scenario
//! let mesh = Mesh::uniform(0.0, 1.0, 20)?;
//! let op = SpectralDifferenceOperator::new(mesh, 3, 1.0, 0.001)?;
//! let dt = op.time_step(0.1, 1.0)?;
//! let scenario = Scenario::from_spatial(op, &Sine { length: 1.0, periods: 1 });
//!
//! // 2. Configuration
//! let config = SolverConfiguration::with_step(0.25, dt)?;
//!
//! // 3. Integration
//! let result = ExplicitRungeKutta::rk4().solve(&scenario, &config)?;
//!
//! // 4. Trajectory
//! assert_eq!(result.time_points.last(), Some(&0.25));
//! assert_eq!(result.final_state.len(), 60);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`system`]: ODE system contract, closure-backed problems, Hessians
//! - [`spatial`]: meshes, finite-difference and spectral-difference operators
//! - [`solver`]: explicit Runge-Kutta, BDF and exponential integrators
//! - [`linalg`]: Lagrange bases, quadrature nodes, Krylov and dense exponentials
//! - [`error`]: error type
//!
//! # Logging
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod error;
pub mod linalg;
pub mod solver;
pub mod spatial;
pub mod system;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use pie_rs::prelude::*;
    //! ```
    pub use crate::error::{PieError, PieResult};
    pub use crate::solver::{
        Bdf, ExplicitRungeKutta, ExponentialEuler, ExponentialIntegrator, ExponentialVariant, Scenario,
        SimulationResult, Solver, SolverConfiguration, TimeGrid,
    };
    pub use crate::spatial::{
        FiniteDifferenceBurgers, FiniteDifferenceOperator, Gaussian, InitialCondition, Mesh, Rectangle, Sine,
        SpatialOperator, SpectralDifferenceBurgers, SpectralDifferenceOperator, TrimmedSine,
    };
    pub use crate::system::{OdeProblem, OdeSystem};
}
