//! Time grids
//!
//! Integrators step between consecutive grid points, so a grid is any strictly
//! increasing sequence of at least two finite times. Steps may differ in size.

use std::fmt;

use crate::error::{PieError, PieResult};

/// Relative slack below which a trailing step is merged into the final time
const END_SLACK: f64 = 1e-10;

/// Strictly increasing sequence of output times
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// `steps` equal steps from `t0` to `t_end`
    ///
    /// # Example
    ///
    /// ```rust
    /// use pie_rs::solver::TimeGrid;
    ///
    /// let grid = TimeGrid::uniform(0.0, 1.0, 4).unwrap();
    /// assert_eq!(grid.points(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    /// ```
    pub fn uniform(t0: f64, t_end: f64, steps: usize) -> PieResult<Self> {
        if steps == 0 {
            return Err(PieError::InvalidTimeGrid {
                reason: "at least one step is required".to_string(),
            });
        }
        check_interval(t0, t_end)?;

        let dt = (t_end - t0) / steps as f64;
        let mut points: Vec<f64> = (0..steps).map(|k| t0 + k as f64 * dt).collect();
        points.push(t_end);

        Self::from_points(points)
    }

    /// Regular steps of `dt` from `t0`, plus a shortened last step ending on `t_end`
    ///
    /// ```rust
    /// use pie_rs::solver::TimeGrid;
    ///
    /// let grid = TimeGrid::with_step(0.0, 1.0, 0.3).unwrap();
    /// assert_eq!(grid.len(), 5);
    /// assert_eq!(grid.end(), 1.0);
    /// ```
    pub fn with_step(t0: f64, t_end: f64, dt: f64) -> PieResult<Self> {
        check_interval(t0, t_end)?;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PieError::InvalidTimeGrid {
                reason: format!("step must be positive and finite, got {dt}"),
            });
        }

        let mut points = Vec::new();
        let mut k = 0usize;
        loop {
            let t = t0 + k as f64 * dt;
            if t >= t_end - END_SLACK * dt {
                break;
            }
            points.push(t);
            k += 1;
        }
        points.push(t_end);

        Self::from_points(points)
    }

    /// Arbitrary grid
    ///
    /// # Errors
    ///
    /// `InvalidTimeGrid` when there are fewer than two points, a point is not
    /// finite, or the sequence is not strictly increasing.
    pub fn from_points(points: Vec<f64>) -> PieResult<Self> {
        if points.len() < 2 {
            return Err(PieError::InvalidTimeGrid {
                reason: format!("at least 2 points are required, got {}", points.len()),
            });
        }
        if let Some(t) = points.iter().find(|t| !t.is_finite()) {
            return Err(PieError::InvalidTimeGrid {
                reason: format!("non-finite time {t}"),
            });
        }
        if let Some(k) = points.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PieError::InvalidTimeGrid {
                reason: format!(
                    "times must be strictly increasing (t[{}] = {}, t[{}] = {})",
                    k,
                    points[k],
                    k + 1,
                    points[k + 1]
                ),
            });
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of points (steps + 1)
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a valid grid holds at least two points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn steps(&self) -> usize {
        self.points.len() - 1
    }

    pub fn start(&self) -> f64 {
        self.points[0]
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Largest step size
    pub fn max_step(&self) -> f64 {
        self.points.windows(2).map(|w| w[1] - w[0]).fold(0.0, f64::max)
    }
}

impl fmt::Display for TimeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] in {} steps (max dt = {:.3e})",
            self.start(),
            self.end(),
            self.steps(),
            self.max_step()
        )
    }
}

fn check_interval(t0: f64, t_end: f64) -> PieResult<()> {
    if !(t0.is_finite() && t_end.is_finite()) || t_end <= t0 {
        return Err(PieError::InvalidTimeGrid {
            reason: format!("end time {t_end} must be finite and after start time {t0}"),
        });
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_ends_exactly() {
        let grid = TimeGrid::uniform(0.0, 0.3, 3).unwrap();
        assert_eq!(grid.steps(), 3);
        assert_eq!(grid.end(), 0.3);
        assert_relative_eq!(grid.points()[1], 0.1, epsilon = 1e-15);
    }

    #[test]
    fn test_with_step_short_last_step() {
        let grid = TimeGrid::with_step(0.0, 1.0, 0.3).unwrap();
        assert_eq!(grid.len(), 5);
        assert_relative_eq!(grid.points()[3], 0.9, epsilon = 1e-14);
        assert_eq!(grid.end(), 1.0);
    }

    #[test]
    fn test_with_step_exact_division_has_no_sliver() {
        // 0.1 * 10 is not exactly 1.0 in binary
        let grid = TimeGrid::with_step(0.0, 1.0, 0.1).unwrap();
        assert_eq!(grid.steps(), 10);
        assert!(grid.points().windows(2).all(|w| w[1] - w[0] > 0.05));
    }

    #[test]
    fn test_invalid_grids() {
        assert!(TimeGrid::uniform(0.0, 1.0, 0).is_err());
        assert!(TimeGrid::uniform(1.0, 1.0, 3).is_err());
        assert!(TimeGrid::with_step(0.0, 1.0, 0.0).is_err());
        assert!(TimeGrid::with_step(0.0, 1.0, f64::NAN).is_err());
        assert!(TimeGrid::from_points(vec![0.0]).is_err());
        assert!(TimeGrid::from_points(vec![0.0, 0.5, 0.5]).is_err());
        assert!(TimeGrid::from_points(vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_max_step() {
        let grid = TimeGrid::from_points(vec![0.0, 0.1, 0.4, 0.5]).unwrap();
        assert_relative_eq!(grid.max_step(), 0.3, epsilon = 1e-15);
    }
}
