//! Temporal integrators
//!
//! Concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! ## Explicit
//!
//! - **[`ExplicitRungeKutta`]**: any explicit Butcher tableau
//!   - presets: forward Euler (1), explicit midpoint (2), classical RK4 (4)
//!   - cost: one right-hand side evaluation per stage
//!   - use: non-stiff problems, CFL-limited time steps
//!
//! ## Implicit
//!
//! - **[`Bdf`]**: backward differentiation formulas of order 1 to 6
//!   - cost: one Newton solve per step (LU of `I - βhJ`)
//!   - use: stiff problems (diffusion dominated, fine meshes)
//!
//! ## Exponential
//!
//! - **[`ExponentialIntegrator`]**: Taylor / Rosenbrock, order 1 to 3
//!   - cost: one exponential of a `(d + order)`-square matrix per step,
//!     dense or in a Krylov subspace
//!   - use: stiff linear part, large steps
//! - **[`ExponentialEuler`]**: `φ₁`-based exponential Euler
//!
//! # Example
//!
//! ```rust
//! use pie_rs::solver::{Bdf, ExplicitRungeKutta, ExponentialIntegrator, Scenario, Solver, SolverConfiguration};
//! use pie_rs::spatial::{FiniteDifferenceOperator, Mesh, Sine};
//!
//! let mesh = Mesh::uniform(0.0, 1.0, 40).unwrap();
//! let op = FiniteDifferenceOperator::new(mesh, 1, 1.0, 0.001).unwrap();
//! let scenario = Scenario::from_spatial(op, &Sine { length: 1.0, periods: 1 });
//! let config = SolverConfiguration::time_evolution(0.5, 100).unwrap();
//!
//! let solvers: Vec<Box<dyn Solver>> = vec![
//!     Box::new(ExplicitRungeKutta::rk4()),
//!     Box::new(Bdf::new(2).unwrap()),
//!     Box::new(ExponentialIntegrator::rosenbrock(1).unwrap()),
//! ];
//! for solver in &solvers {
//!     let result = solver.solve(&scenario, &config).unwrap();
//!     assert_eq!(result.len(), 101);
//! }
//! ```
//!
//! # Design
//!
//! Every solver is stateless between calls: the same instance can advance
//! any number of systems, including concurrently.

pub mod bdf;
pub mod exponential;
pub mod newton;
pub mod runge_kutta;

pub use bdf::Bdf;
pub use exponential::{ExponentialEuler, ExponentialIntegrator, ExponentialVariant};
pub use newton::{ConvergencePolicy, NewtonOutcome, NewtonSettings};
pub use runge_kutta::{ButcherTableau, ExplicitRungeKutta};
