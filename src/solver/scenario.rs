//! Simulation scenario definition
//!
//! A scenario pairs an ODE system with its initial state: the "WHAT to solve".
//! The same scenario can be integrated with different solvers.

use std::fmt;

use nalgebra::DVector;

use crate::error::{PieError, PieResult};
use crate::spatial::{InitialCondition, SpatialOperator};
use crate::system::OdeSystem;

/// System plus initial state
///
/// # Examples
///
/// ```rust
/// use pie_rs::solver::Scenario;
/// use pie_rs::spatial::{FiniteDifferenceOperator, Mesh, Sine};
///
/// let mesh = Mesh::uniform(0.0, 1.0, 50).unwrap();
/// let op = FiniteDifferenceOperator::new(mesh, 1, 1.0, 0.0).unwrap();
/// let scenario = Scenario::from_spatial(op, &Sine { length: 1.0, periods: 1 });
///
/// assert_eq!(scenario.dim(), 50);
/// assert!(scenario.validate().is_ok());
/// ```
pub struct Scenario {
    /// Right-hand side and derivatives
    pub system: Box<dyn OdeSystem>,

    /// State at the first grid time
    pub initial_state: DVector<f64>,
}

impl Scenario {
    pub fn new(system: Box<dyn OdeSystem>, initial_state: DVector<f64>) -> Self {
        Self { system, initial_state }
    }

    /// Spatial operator with an initial condition sampled on its solution points
    pub fn from_spatial<S>(operator: S, condition: &dyn InitialCondition) -> Self
    where
        S: SpatialOperator + 'static,
    {
        let initial_state = operator.initial_state(condition);
        Self::new(Box::new(operator), initial_state)
    }

    /// Initial state length matches the system and holds finite values
    pub fn validate(&self) -> PieResult<()> {
        self.system.check_state(&self.initial_state)?;
        if self.initial_state.iter().any(|x| !x.is_finite()) {
            return Err(PieError::InvalidConfiguration {
                reason: "initial state contains NaN or infinite values".to_string(),
            });
        }
        Ok(())
    }

    pub fn system_name(&self) -> &str {
        self.system.name()
    }

    pub fn dim(&self) -> usize {
        self.system.dim()
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("system", &self.system_name())
            .field("dimension", &self.dim())
            .field("initial_state", &self.initial_state.len())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::OdeProblem;

    fn decay() -> Box<dyn OdeSystem> {
        Box::new(OdeProblem::new("decay", 2, |y, _t| -y))
    }

    #[test]
    fn test_scenario_creation() {
        let scenario = Scenario::new(decay(), DVector::from_element(2, 1.0));
        assert_eq!(scenario.system_name(), "decay");
        assert_eq!(scenario.dim(), 2);
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let scenario = Scenario::new(decay(), DVector::from_element(3, 1.0));
        assert!(matches!(
            scenario.validate(),
            Err(PieError::DimensionMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite_initial_state_is_rejected() {
        let scenario = Scenario::new(decay(), DVector::from_vec(vec![1.0, f64::NAN]));
        assert!(scenario.validate().is_err());
    }
}
