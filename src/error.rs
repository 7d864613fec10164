//! Error types
//!
//! Construction problems (bad mesh, bad point count, bad tableau) are fatal and
//! surface immediately. Per-step numerical trouble is normally recovered where
//! it happens and only logged; the variants below that describe it are returned
//! when the caller asked for strict behaviour.

use thiserror::Error;

use crate::system::Derivative;

/// Result alias used across the crate
pub type PieResult<T> = Result<T, PieError>;

/// Errors raised by spatial operators and temporal integrators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PieError {
    /// Malformed mesh (non-monotonic, non-finite, no cell)
    #[error("invalid mesh: {reason}")]
    InvalidMesh { reason: String },

    /// Per-cell solution point count must be at least 1
    #[error("invalid point count per cell: {requested} (at least 1 required)")]
    InvalidPointCount { requested: usize },

    /// State or matrix length does not match the system dimension
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        context: &'static str,
    },

    /// Time grid is empty, too short or not strictly increasing
    #[error("invalid time grid: {reason}")]
    InvalidTimeGrid { reason: String },

    /// Butcher tableau is not a consistent explicit scheme
    #[error("invalid Butcher tableau: {reason}")]
    InvalidTableau { reason: String },

    /// Method order outside the supported range
    #[error("{method} does not support order {order}")]
    InvalidOrder { method: &'static str, order: usize },

    /// Any other configuration value out of range
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A derivative required by the integrator is not provided by the system
    #[error("{system} does not provide its {derivative}")]
    MissingDerivative {
        system: String,
        derivative: Derivative,
    },

    /// Implicit step did not converge and the policy forbids accepting it
    #[error(
        "nonlinear solve did not converge at step {step} (t = {time}): \
         {iterations} iterations, residual {residual:.3e}"
    )]
    ConvergenceFailure {
        step: usize,
        time: f64,
        iterations: usize,
        residual: f64,
    },

    /// NaN or infinity in an accepted state
    #[error(
        "non-finite value in state at step {step} (t = {time}); \
         the time step is probably above the stability limit"
    )]
    NonFiniteState { step: usize, time: f64 },
}

impl PieError {
    /// Shorthand for [`PieError::DimensionMismatch`]
    pub fn dimension(expected: usize, found: usize, context: &'static str) -> Self {
        Self::DimensionMismatch {
            expected,
            found,
            context,
        }
    }

    /// True for errors that can only come from building an object
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            PieError::InvalidMesh { .. }
                | PieError::InvalidPointCount { .. }
                | PieError::InvalidTableau { .. }
                | PieError::InvalidOrder { .. }
        )
    }
}
