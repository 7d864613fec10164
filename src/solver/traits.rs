//! Temporal integrator traits and types
//!
//! # Design
//!
//! - [`Solver`]: the integrator contract. `advance` steps an [`OdeSystem`]
//!   across a [`TimeGrid`]; `solve` is the scenario/configuration front end.
//! - [`SolverConfiguration`]: HOW to integrate (time grid, progress reporting)
//! - [`SimulationResult`]: trajectory at every grid point plus metadata
//!
//! The same scenario can be integrated with any solver and any configuration.

use std::collections::HashMap;

use log::info;
use nalgebra::DVector;

use crate::error::{PieError, PieResult};
use crate::solver::{LogProgress, ProgressReporter, Scenario, SilentProgress, TimeGrid};
use crate::system::OdeSystem;

// =================================================================================================
// Solver trait
// =================================================================================================

/// Temporal integrator
///
/// # Contract
///
/// - the returned trajectory has one state per grid point, starting with `y0`
/// - step `i` maps the state at `t_i` to the state at `t_{i+1}` and nothing
///   between two grid points is observable
/// - `progress` is told about every completed step
///
/// # Example
///
/// ```rust
/// use nalgebra::DVector;
/// use pie_rs::solver::{ExplicitRungeKutta, SilentProgress, Solver, TimeGrid};
/// use pie_rs::system::OdeProblem;
///
/// let decay = OdeProblem::new("decay", 1, |y, _t| -y);
/// let grid = TimeGrid::uniform(0.0, 1.0, 100).unwrap();
///
/// let result = ExplicitRungeKutta::rk4()
///     .advance(&decay, &DVector::from_element(1, 1.0), &grid, &SilentProgress)
///     .unwrap();
///
/// assert!((result.final_state[0] - (-1.0_f64).exp()).abs() < 1e-9);
/// ```
pub trait Solver {
    /// Integrate `system` from `y0` over every step of `grid`
    fn advance(
        &self,
        system: &dyn OdeSystem,
        y0: &DVector<f64>,
        grid: &TimeGrid,
        progress: &dyn ProgressReporter,
    ) -> PieResult<SimulationResult>;

    /// Integrate a scenario with a configuration
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> PieResult<SimulationResult> {
        scenario.validate()?;

        info!(
            "{}: integrating '{}' (dim = {}) over {}",
            self.name(),
            scenario.system_name(),
            scenario.dim(),
            config.time_grid
        );

        let result = if config.report_progress {
            let progress = LogProgress::new();
            self.advance(scenario.system.as_ref(), &scenario.initial_state, &config.time_grid, &progress)?
        } else {
            self.advance(scenario.system.as_ref(), &scenario.initial_state, &config.time_grid, &SilentProgress)?
        };

        info!("{}: done, {} steps", self.name(), result.len() - 1);
        Ok(result)
    }

    /// Human-readable method name
    fn name(&self) -> &str;
}

/// Common entry checks of `advance`
pub(crate) fn check_initial_state(system: &dyn OdeSystem, y0: &DVector<f64>, t0: f64) -> PieResult<()> {
    if y0.len() != system.dim() {
        return Err(PieError::dimension(system.dim(), y0.len(), "initial state"));
    }
    crate::solver::validate_state(y0, 0, t0)
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration of a temporal integration
///
/// # Examples
///
/// ```rust
/// use pie_rs::solver::SolverConfiguration;
///
/// // 1000 equal steps up to t = 2
/// let config = SolverConfiguration::time_evolution(2.0, 1000).unwrap();
/// assert_eq!(config.time_grid.steps(), 1000);
///
/// // Steps of 0.3 up to t = 1, the last one shortened
/// let config = SolverConfiguration::with_step(1.0, 0.3).unwrap().with_progress(true);
/// assert_eq!(config.time_grid.steps(), 4);
/// assert!(config.report_progress);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfiguration {
    /// Output times, starting with the initial time
    pub time_grid: TimeGrid,

    /// Log progress through `log::info!` (default: false)
    pub report_progress: bool,
}

impl SolverConfiguration {
    /// Integrate over an explicit grid
    pub fn from_grid(time_grid: TimeGrid) -> Self {
        Self {
            time_grid,
            report_progress: false,
        }
    }

    /// `time_steps` equal steps from 0 to `total_time`
    pub fn time_evolution(total_time: f64, time_steps: usize) -> PieResult<Self> {
        Ok(Self::from_grid(TimeGrid::uniform(0.0, total_time, time_steps)?))
    }

    /// Steps of `dt` from 0 to `total_time`, the last one shortened
    pub fn with_step(total_time: f64, dt: f64) -> PieResult<Self> {
        Ok(Self::from_grid(TimeGrid::with_step(0.0, total_time, dt)?))
    }

    pub fn with_progress(mut self, report_progress: bool) -> Self {
        self.report_progress = report_progress;
        self
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Trajectory of an integration
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Grid times
    pub time_points: Vec<f64>,

    /// State at every grid time, `state_trajectory[0]` is the initial state
    pub state_trajectory: Vec<DVector<f64>>,

    /// Last state of the trajectory
    pub final_state: DVector<f64>,

    /// Free-form description (solver, steps, evaluations, ...)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new(time_points: Vec<f64>, state_trajectory: Vec<DVector<f64>>, final_state: DVector<f64>) -> Self {
        Self {
            time_points,
            state_trajectory,
            final_state,
            metadata: HashMap::new(),
        }
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Number of stored states
    pub fn len(&self) -> usize {
        self.state_trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_trajectory.is_empty()
    }

    /// Stored state closest to time `t`
    pub fn state_at(&self, t: f64) -> Option<&DVector<f64>> {
        let index = self
            .time_points
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - t).abs().total_cmp(&(b.1 - t).abs()))
            .map(|(i, _)| i)?;
        self.state_trajectory.get(index)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_builders() {
        let config = SolverConfiguration::time_evolution(1.0, 10).unwrap();
        assert_eq!(config.time_grid.len(), 11);
        assert!(!config.report_progress);

        assert!(SolverConfiguration::time_evolution(-1.0, 10).is_err());
        assert!(SolverConfiguration::with_step(1.0, -0.1).is_err());
    }

    #[test]
    fn test_result_metadata_and_lookup() {
        let states = vec![DVector::from_element(1, 0.0), DVector::from_element(1, 1.0)];
        let mut result = SimulationResult::new(vec![0.0, 0.5], states, DVector::from_element(1, 1.0));
        result.add_metadata("solver", "test");

        assert_eq!(result.len(), 2);
        assert_eq!(result.metadata.get("solver").map(String::as_str), Some("test"));
        assert_eq!(result.state_at(0.4).map(|s| s[0]), Some(1.0));
        assert_eq!(result.state_at(0.1).map(|s| s[0]), Some(0.0));
    }
}
