//! Closure-backed ODE system
//!
//! `OdeProblem` turns plain closures into an [`OdeSystem`], which is the
//! quickest way to hand a scalar or small vector ODE to an integrator:
//!
//! ```rust
//! use nalgebra::{DMatrix, DVector};
//! use pie_rs::system::{OdeProblem, OdeSystem};
//!
//! // ẏ = -2y
//! let problem = OdeProblem::new("decay", 1, |y, _t| y * -2.0)
//!     .with_jacobian(|_y, _t| DMatrix::from_element(1, 1, -2.0));
//!
//! let y = DVector::from_element(1, 1.0);
//! assert_eq!(problem.rhs(&y, 0.0).unwrap()[0], -2.0);
//! assert!(problem.provides_jacobian());
//! ```

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::error::PieResult;
use crate::system::{Derivative, Hessian, OdeSystem};

type VectorFn = Box<dyn Fn(&DVector<f64>, f64) -> DVector<f64> + Send + Sync>;
type MatrixFn = Box<dyn Fn(&DVector<f64>, f64) -> DMatrix<f64> + Send + Sync>;
type HessianFn = Box<dyn Fn(&DVector<f64>, f64) -> Hessian + Send + Sync>;

/// ODE system ẏ = f(y, t) defined by closures
///
/// Only the right-hand side is mandatory. Every derivative left unset keeps
/// the [`OdeSystem`] default: missing for `jac`/`hess`, zero for the time
/// partials.
pub struct OdeProblem {
    name: String,
    dim: usize,
    rhs: VectorFn,
    jac: Option<MatrixFn>,
    hess: Option<HessianFn>,
    df_dt: Option<VectorFn>,
    d2f_dt2: Option<VectorFn>,
    d2f_dtdy: Option<MatrixFn>,
}

impl OdeProblem {
    /// Create a problem of dimension `dim` from its right-hand side
    pub fn new<F>(name: impl Into<String>, dim: usize, rhs: F) -> Self
    where
        F: Fn(&DVector<f64>, f64) -> DVector<f64> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dim,
            rhs: Box::new(rhs),
            jac: None,
            hess: None,
            df_dt: None,
            d2f_dt2: None,
            d2f_dtdy: None,
        }
    }

    /// Attach the Jacobian ∂f/∂y
    pub fn with_jacobian<F>(mut self, jac: F) -> Self
    where
        F: Fn(&DVector<f64>, f64) -> DMatrix<f64> + Send + Sync + 'static,
    {
        self.jac = Some(Box::new(jac));
        self
    }

    /// Attach the Hessian ∂²f/∂y²
    pub fn with_hessian<F>(mut self, hess: F) -> Self
    where
        F: Fn(&DVector<f64>, f64) -> Hessian + Send + Sync + 'static,
    {
        self.hess = Some(Box::new(hess));
        self
    }

    /// Attach ∂f/∂t
    pub fn with_time_derivative<F>(mut self, df_dt: F) -> Self
    where
        F: Fn(&DVector<f64>, f64) -> DVector<f64> + Send + Sync + 'static,
    {
        self.df_dt = Some(Box::new(df_dt));
        self
    }

    /// Attach ∂²f/∂t²
    pub fn with_second_time_derivative<F>(mut self, d2f_dt2: F) -> Self
    where
        F: Fn(&DVector<f64>, f64) -> DVector<f64> + Send + Sync + 'static,
    {
        self.d2f_dt2 = Some(Box::new(d2f_dt2));
        self
    }

    /// Attach ∂²f/∂t∂y
    pub fn with_cross_derivative<F>(mut self, d2f_dtdy: F) -> Self
    where
        F: Fn(&DVector<f64>, f64) -> DMatrix<f64> + Send + Sync + 'static,
    {
        self.d2f_dtdy = Some(Box::new(d2f_dtdy));
        self
    }
}

impl OdeSystem for OdeProblem {
    fn dim(&self) -> usize {
        self.dim
    }

    fn rhs(&self, y: &DVector<f64>, t: f64) -> PieResult<DVector<f64>> {
        self.check_state(y)?;
        Ok((self.rhs)(y, t))
    }

    fn provides_jacobian(&self) -> bool {
        self.jac.is_some()
    }

    fn jac(&self, y: &DVector<f64>, t: f64) -> PieResult<DMatrix<f64>> {
        self.check_state(y)?;
        match &self.jac {
            Some(jac) => Ok(jac(y, t)),
            None => Err(self.missing(Derivative::Jacobian)),
        }
    }

    fn provides_hessian(&self) -> bool {
        self.hess.is_some()
    }

    fn hess(&self, y: &DVector<f64>, t: f64) -> PieResult<Hessian> {
        self.check_state(y)?;
        match &self.hess {
            Some(hess) => Ok(hess(y, t)),
            None => Err(self.missing(Derivative::Hessian)),
        }
    }

    fn df_dt(&self, y: &DVector<f64>, t: f64) -> PieResult<DVector<f64>> {
        match &self.df_dt {
            Some(f) => Ok(f(y, t)),
            None => Ok(DVector::zeros(self.dim)),
        }
    }

    fn d2f_dt2(&self, y: &DVector<f64>, t: f64) -> PieResult<DVector<f64>> {
        match &self.d2f_dt2 {
            Some(f) => Ok(f(y, t)),
            None => Ok(DVector::zeros(self.dim)),
        }
    }

    fn d2f_dtdy(&self, y: &DVector<f64>, t: f64) -> PieResult<DMatrix<f64>> {
        match &self.d2f_dtdy {
            Some(f) => Ok(f(y, t)),
            None => Ok(DMatrix::zeros(self.dim, self.dim)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for OdeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdeProblem")
            .field("name", &self.name)
            .field("dim", &self.dim)
            .field("jacobian", &self.jac.is_some())
            .field("hessian", &self.hess.is_some())
            .finish()
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rhs_only() {
        let problem = OdeProblem::new("growth", 1, |y, t| y * t);
        let y = DVector::from_element(1, 3.0);

        assert_eq!(problem.rhs(&y, 2.0).unwrap()[0], 6.0);
        assert!(!problem.provides_jacobian());
        assert!(problem.jac(&y, 0.0).is_err());
        assert_eq!(problem.df_dt(&y, 0.0).unwrap()[0], 0.0);
    }

    #[test]
    fn test_all_derivatives() {
        // f(y, t) = t * y²
        let problem = OdeProblem::new("quadratic", 1, |y, t| y.map(|v| t * v * v))
            .with_jacobian(|y, t| DMatrix::from_element(1, 1, 2.0 * t * y[0]))
            .with_hessian(|_y, t| {
                let mut tensor = ndarray::Array3::zeros((1, 1, 1));
                tensor[[0, 0, 0]] = 2.0 * t;
                Hessian::from_tensor(tensor).unwrap_or_else(|_| Hessian::zeros(1))
            })
            .with_time_derivative(|y, _t| y.map(|v| v * v))
            .with_cross_derivative(|y, _t| DMatrix::from_element(1, 1, 2.0 * y[0]));

        let y = DVector::from_element(1, 2.0);
        assert_eq!(problem.jac(&y, 3.0).unwrap()[(0, 0)], 12.0);
        assert_eq!(problem.hess(&y, 3.0).unwrap().get(0, 0, 0), 6.0);
        assert_eq!(problem.df_dt(&y, 3.0).unwrap()[0], 4.0);
        assert_eq!(problem.d2f_dtdy(&y, 3.0).unwrap()[(0, 0)], 4.0);
        assert_eq!(problem.d2f_dt2(&y, 3.0).unwrap()[0], 0.0);
    }

    #[test]
    fn test_dimension_is_checked() {
        let problem = OdeProblem::new("pair", 2, |y, _t| y.clone());
        let y = DVector::from_element(3, 1.0);
        assert!(problem.rhs(&y, 0.0).is_err());
    }
}
