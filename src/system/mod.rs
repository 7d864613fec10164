//! ODE systems
//!
//! This module provides the contract every right-hand side implements.
//! An ODE system encapsulates the equations ẏ = f(y, t) and, optionally,
//! their derivatives.
//!
//! # Core Concepts
//!
//! - **OdeSystem**: Evaluates f, its Jacobian, its Hessian and its time partials
//! - **Hessian**: Third-order tensor, stored lazily when identically zero
//! - **OdeProblem**: Closure-backed system for small test problems
//!
//! # Architecture
//!
//! ODE systems are **separate from temporal integrators**:
//! - The system provides the **equations** (spatial operator or analytic ODE)
//! - The integrator provides the **method** to advance them in time
//!
//! This separation allows:
//! - Same spatial operator with different integrators (RK, BDF, exponential)
//! - Same integrator with different operators (finite / spectral difference)
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DVector;
//! use pie_rs::system::{OdeProblem, OdeSystem};
//!
//! // Logistic growth ẏ = y (1 - y)
//! let system = OdeProblem::new("logistic", 1, |y, _t| y.map(|v| v * (1.0 - v)));
//!
//! let y = DVector::from_element(1, 0.5);
//! assert_eq!(system.rhs(&y, 0.0).unwrap()[0], 0.25);
//! ```

pub mod hessian;
pub mod problem;
pub mod traits;

pub use hessian::Hessian;
pub use problem::OdeProblem;
pub use traits::{Derivative, OdeSystem};
