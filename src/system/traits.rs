//! ODE system traits and types
//!
//! This module defines the contract between the equations and the integrators:
//! - `OdeSystem`: trait for every right-hand side ẏ = f(y, t)
//! - `Derivative`: type-safe identifier for the optional derivatives

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};
use crate::system::Hessian;

// =================================================================================================
// Derivatives (type-safe identifiers)
// =================================================================================================

/// Optional derivatives an `OdeSystem` may provide
///
/// Used in [`PieError::MissingDerivative`] so that callers can tell which
/// capability an integrator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivative {
    /// ∂f/∂y
    Jacobian,

    /// ∂²f/∂y²
    Hessian,
}

impl fmt::Display for Derivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Derivative::Jacobian => write!(f, "Jacobian"),
            Derivative::Hessian => write!(f, "Hessian"),
        }
    }
}

// =================================================================================================
// ODE System Trait
// =================================================================================================

/// Trait for ODE systems ẏ = f(y, t)
///
/// # Responsibility
/// Evaluates the right-hand side and, when available, its derivatives.
/// Does NOT integrate them (that's the Solver's job).
///
/// Spatial operators implement this trait with `dim() == n_points`; scalar
/// problems use `dim() == 1`. The state is always a `DVector<f64>` of length
/// `dim()`, so there is no distinction between scalar and vector problems.
///
/// # Optional capabilities
///
/// `jac` and `hess` default to [`PieError::MissingDerivative`]. Implementors
/// that override them must also override `provides_jacobian` /
/// `provides_hessian` so integrators can choose a fallback path up front
/// (BDF switches to a finite-difference Jacobian, exponential methods fail).
///
/// The partial time derivatives default to zero, which is exact for every
/// autonomous system (all spatial operators in this crate).
pub trait OdeSystem: Send + Sync {
    /// Dimension of the state vector
    fn dim(&self) -> usize;

    /// Right-hand side f(y, t)
    fn rhs(&self, y: &DVector<f64>, t: f64) -> PieResult<DVector<f64>>;

    /// Whether [`OdeSystem::jac`] is implemented
    fn provides_jacobian(&self) -> bool {
        false
    }

    /// Jacobian ∂f/∂y, a `dim × dim` matrix
    fn jac(&self, _y: &DVector<f64>, _t: f64) -> PieResult<DMatrix<f64>> {
        Err(self.missing(Derivative::Jacobian))
    }

    /// Whether [`OdeSystem::hess`] is implemented
    fn provides_hessian(&self) -> bool {
        false
    }

    /// Hessian ∂²f/∂y², a `dim × dim × dim` tensor
    fn hess(&self, _y: &DVector<f64>, _t: f64) -> PieResult<Hessian> {
        Err(self.missing(Derivative::Hessian))
    }

    /// Partial derivative ∂f/∂t
    fn df_dt(&self, _y: &DVector<f64>, _t: f64) -> PieResult<DVector<f64>> {
        Ok(DVector::zeros(self.dim()))
    }

    /// Second partial derivative ∂²f/∂t²
    fn d2f_dt2(&self, _y: &DVector<f64>, _t: f64) -> PieResult<DVector<f64>> {
        Ok(DVector::zeros(self.dim()))
    }

    /// Crossed partial derivative ∂²f/∂t∂y
    fn d2f_dtdy(&self, _y: &DVector<f64>, _t: f64) -> PieResult<DMatrix<f64>> {
        Ok(DMatrix::zeros(self.dim(), self.dim()))
    }

    /// Name of the system (used in logs and errors)
    fn name(&self) -> &str;

    /// Check that `y` has the right length
    fn check_state(&self, y: &DVector<f64>) -> PieResult<()> {
        if y.len() != self.dim() {
            return Err(PieError::dimension(self.dim(), y.len(), "state vector"));
        }
        Ok(())
    }

    /// Build the error returned by unimplemented derivatives
    fn missing(&self, derivative: Derivative) -> PieError {
        PieError::MissingDerivative {
            system: self.name().to_string(),
            derivative,
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
