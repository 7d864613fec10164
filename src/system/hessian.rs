//! Hessian tensor
//!
//! Third-order derivative container `H[k, l, m] = ∂²f_k / ∂y_l ∂y_m`.
//!
//! # Memory Layout
//!
//! A dense `n × n × n` tensor of `f64` takes `8n³` bytes (8 MB for n = 100),
//! so linear operators never materialise theirs: a zero Hessian is stored as
//! its dimension only and every query on it is answered without allocation.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use ndarray::Array3;

use crate::error::{PieError, PieResult};

/// Second derivative of a right-hand side with respect to the state
#[derive(Debug, Clone, PartialEq)]
pub struct Hessian {
    dim: usize,

    /// `None` for an identically zero Hessian
    tensor: Option<Array3<f64>>,
}

impl Hessian {
    /// Identically zero Hessian (linear right-hand side)
    pub fn zeros(dim: usize) -> Self {
        Self { dim, tensor: None }
    }

    /// Wrap a dense tensor
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when the tensor is not cubic.
    pub fn from_tensor(tensor: Array3<f64>) -> PieResult<Self> {
        let (a, b, c) = tensor.dim();
        if a != b || b != c {
            return Err(PieError::dimension(a, if a != b { b } else { c }, "Hessian tensor"));
        }
        Ok(Self {
            dim: a,
            tensor: Some(tensor),
        })
    }

    /// Dimension `n` of the `n × n × n` tensor
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// True when no tensor was stored
    pub fn is_zero(&self) -> bool {
        self.tensor.is_none()
    }

    /// Entry `∂²f_k / ∂y_l ∂y_m`
    pub fn get(&self, k: usize, l: usize, m: usize) -> f64 {
        match &self.tensor {
            Some(tensor) => tensor[[k, l, m]],
            None => 0.0,
        }
    }

    /// Borrow the dense tensor, if any
    pub fn tensor(&self) -> Option<&Array3<f64>> {
        self.tensor.as_ref()
    }

    /// Bilinear contraction `w_k = Σ_lm H[k, l, m] u_l v_m`
    pub fn contract(&self, u: &DVector<f64>, v: &DVector<f64>) -> PieResult<DVector<f64>> {
        if u.len() != self.dim {
            return Err(PieError::dimension(self.dim, u.len(), "Hessian contraction"));
        }
        if v.len() != self.dim {
            return Err(PieError::dimension(self.dim, v.len(), "Hessian contraction"));
        }
        let Some(tensor) = &self.tensor else {
            return Ok(DVector::zeros(self.dim));
        };

        Ok(DVector::from_fn(self.dim, |k, _| {
            let mut sum = 0.0;
            for l in 0..self.dim {
                if u[l] == 0.0 {
                    continue;
                }
                for m in 0..self.dim {
                    sum += tensor[[k, l, m]] * u[l] * v[m];
                }
            }
            sum
        }))
    }

    /// Slice `∂(∂f_k/∂y)/∂y`, the Hessian of the k-th component
    pub fn component(&self, k: usize) -> DMatrix<f64> {
        DMatrix::from_fn(self.dim, self.dim, |l, m| self.get(k, l, m))
    }
}

impl fmt::Display for Hessian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "Hessian [{0} * {0} * {0}] (zero)", self.dim)
        } else {
            write!(f, "Hessian [{0} * {0} * {0}]", self.dim)
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_hessian() {
        let hessian = Hessian::zeros(4);
        let u = DVector::from_element(4, 1.0);

        assert!(hessian.is_zero());
        assert_eq!(hessian.get(1, 2, 3), 0.0);
        assert_eq!(hessian.contract(&u, &u).unwrap(), DVector::zeros(4));
        assert_eq!(hessian.to_string(), "Hessian [4 * 4 * 4] (zero)");
    }

    #[test]
    fn test_contraction() {
        // f(y) = (y0 * y1, y1²) → H[0,0,1] = H[0,1,0] = 1, H[1,1,1] = 2
        let mut tensor = Array3::zeros((2, 2, 2));
        tensor[[0, 0, 1]] = 1.0;
        tensor[[0, 1, 0]] = 1.0;
        tensor[[1, 1, 1]] = 2.0;
        let hessian = Hessian::from_tensor(tensor).unwrap();

        let u = DVector::from_vec(vec![2.0, 3.0]);
        let w = hessian.contract(&u, &u).unwrap();

        assert_eq!(w[0], 12.0);
        assert_eq!(w[1], 18.0);
        assert_eq!(hessian.component(1)[(1, 1)], 2.0);
    }

    #[test]
    fn test_non_cubic_tensor_is_rejected() {
        let tensor = Array3::zeros((2, 3, 3));
        assert!(Hessian::from_tensor(tensor).is_err());
    }

    #[test]
    fn test_contraction_dimension_check() {
        let hessian = Hessian::zeros(3);
        let u = DVector::zeros(2);
        assert!(hessian.contract(&u, &u).is_err());
    }
}
