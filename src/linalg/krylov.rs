//! Krylov approximation of the matrix exponential action
//!
//! # Algorithm
//!
//! For `A ∈ ℝ^{d×d}` and `b ∈ ℝ^d`, an orthonormal basis `V = [v_0 … v_{k-1}]` of
//!
//! ```text
//! K_k(A, b) = span{b, Ab, A²b, …, A^{k-1}b}
//! ```
//!
//! is built by repeated multiplication and modified Gram-Schmidt, applied twice. `A` is projected
//! onto it (`H = Vᵀ A V`, size `k × k`) and
//!
//! ```text
//! exp(A)·b ≈ V · exp(H) · Vᵀ b = ‖b‖ · V · exp(H) · e_0
//! ```
//!
//! The dense exponential is only ever taken of the small `H`.
//!
//! # Early termination
//!
//! When a new orthogonalised vector has norm below `tolerance · ‖b‖`, the
//! subspace is invariant under `A` and the projection is exact. The basis is
//! truncated there; this is not an error.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};

/// Default breakdown tolerance relative to `‖b‖`
pub const DEFAULT_KRYLOV_TOLERANCE: f64 = 1e-12;

// =================================================================================================
// Krylov basis
// =================================================================================================

/// Orthonormal Krylov basis together with the projected operator
///
/// Rebuilt from scratch for every `(A, b)` pair.
#[derive(Debug, Clone)]
pub struct KrylovBasis {
    /// `d × k` matrix whose columns are the orthonormal basis vectors
    pub vectors: DMatrix<f64>,

    /// `k × k` projection `Vᵀ A V`
    pub projection: DMatrix<f64>,

    /// `‖b‖`
    pub norm: f64,
}

impl KrylovBasis {
    /// Build a basis of dimension at most `min(max_dim, b.len())`
    ///
    /// A zero `b` yields an empty basis.
    pub fn build(a: &DMatrix<f64>, b: &DVector<f64>, max_dim: usize, tolerance: f64) -> Self {
        let d = b.len();
        let k = max_dim.min(d);
        let norm = b.norm();

        if k == 0 || norm == 0.0 {
            return Self {
                vectors: DMatrix::zeros(d, 0),
                projection: DMatrix::zeros(0, 0),
                norm,
            };
        }

        let mut basis: Vec<DVector<f64>> = Vec::with_capacity(k);
        basis.push(b / norm);

        for i in 1..k {
            let mut w = a * &basis[i - 1];
            // two passes keep V orthonormal to rounding
            for _ in 0..2 {
                for v in &basis {
                    let coefficient = w.dot(v);
                    w.axpy(-coefficient, v, 1.0);
                }
            }

            let w_norm = w.norm();
            if w_norm / norm < tolerance {
                debug!("Krylov subspace invariant after {i} vectors (requested {k})");
                break;
            }
            basis.push(w / w_norm);
        }

        let vectors = DMatrix::from_columns(&basis);
        let projection = vectors.transpose() * a * &vectors;

        Self {
            vectors,
            projection,
            norm,
        }
    }

    /// Number of basis vectors actually built
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// `V · exp(H) · (‖b‖ e_0)`
    pub fn exp_action(&self) -> DVector<f64> {
        if self.dim() == 0 {
            return DVector::zeros(self.vectors.nrows());
        }
        let exp_h = self.projection.clone().exp();
        &self.vectors * (exp_h.column(0) * self.norm)
    }
}

// =================================================================================================
// Krylov exponential
// =================================================================================================

/// Krylov approximation of `exp(A)·b`
///
/// # Example
///
/// ```rust
/// use nalgebra::{DMatrix, DVector};
/// use pie_rs::linalg::KrylovExpm;
///
/// let a = DMatrix::from_diagonal(&DVector::from_vec(vec![-1.0, -2.0, -3.0]));
/// let b = DVector::from_vec(vec![1.0, 1.0, 1.0]);
///
/// // Full subspace: exact up to rounding
/// let krylov = KrylovExpm::new(3).unwrap();
/// let result = krylov.apply(&a, &b).unwrap();
/// assert!((result[2] - (-3.0_f64).exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrylovExpm {
    subspace_dim: usize,
    tolerance: f64,
}

impl KrylovExpm {
    /// Krylov exponential with at most `subspace_dim` basis vectors
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `subspace_dim == 0`.
    pub fn new(subspace_dim: usize) -> PieResult<Self> {
        if subspace_dim == 0 {
            return Err(PieError::InvalidConfiguration {
                reason: "Krylov subspace dimension must be at least 1".to_string(),
            });
        }
        Ok(Self {
            subspace_dim,
            tolerance: DEFAULT_KRYLOV_TOLERANCE,
        })
    }

    /// Override the breakdown tolerance
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the tolerance is not positive and finite.
    pub fn with_tolerance(mut self, tolerance: f64) -> PieResult<Self> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(PieError::InvalidConfiguration {
                reason: format!("Krylov tolerance must be positive, got {tolerance}"),
            });
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Requested subspace dimension (clipped to `b.len()` on use)
    pub fn subspace_dim(&self) -> usize {
        self.subspace_dim
    }

    /// Breakdown tolerance
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Approximate `exp(a)·b`
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` when `a` is not square of size `b.len()`.
    pub fn apply(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> PieResult<DVector<f64>> {
        if a.nrows() != b.len() || a.ncols() != b.len() {
            return Err(PieError::dimension(b.len(), a.nrows().max(a.ncols()), "Krylov operator"));
        }
        let basis = KrylovBasis::build(a, b, self.subspace_dim, self.tolerance);
        Ok(basis.exp_action())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tridiagonal(d: usize) -> DMatrix<f64> {
        DMatrix::from_fn(d, d, |i, j| match i.abs_diff(j) {
            0 => -2.0,
            1 => 1.0,
            _ => 0.0,
        })
    }

    #[test]
    fn test_scalar_multiple_of_identity_needs_one_vector() {
        let a = DMatrix::identity(5, 5) * -0.7;
        let b = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0, 0.0]);

        let result = KrylovExpm::new(1).unwrap().apply(&a, &b).unwrap();
        let expected = &b * (-0.7_f64).exp();

        for i in 0..5 {
            assert_relative_eq!(result[i], expected[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_diagonal_eigenvector_needs_one_vector() {
        let a = DMatrix::from_diagonal(&DVector::from_vec(vec![0.3, -1.0, 2.0]));
        let mut b = DVector::zeros(3);
        b[2] = 4.0;

        let result = KrylovExpm::new(1).unwrap().apply(&a, &b).unwrap();
        assert_relative_eq!(result[2], 4.0 * 2.0_f64.exp(), max_relative = 1e-14);
        assert_eq!(result[0], 0.0);
    }

    #[test]
    fn test_converges_to_dense_exponential() {
        let d = 30;
        let a = tridiagonal(d) * 0.5;
        let b = DVector::from_fn(d, |i, _| (i as f64 * 0.3).sin());
        let exact = a.clone().exp() * &b;

        let mut previous = f64::INFINITY;
        for k in [2, 4, 8, 16] {
            let approx = KrylovExpm::new(k).unwrap().apply(&a, &b).unwrap();
            let error = (&approx - &exact).norm();
            assert!(error < previous, "k = {k}: {error} >= {previous}");
            previous = error;
        }
        assert!(previous < 1e-10);
    }

    #[test]
    fn test_invariant_subspace_terminates_early() {
        // b lies in a 2-dimensional invariant subspace
        let a = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]));
        let b = DVector::from_vec(vec![1.0, 1.0, 0.0, 0.0]);

        let basis = KrylovBasis::build(&a, &b, 4, DEFAULT_KRYLOV_TOLERANCE);
        assert_eq!(basis.dim(), 2);

        let result = basis.exp_action();
        assert_relative_eq!(result[0], 1.0_f64.exp(), max_relative = 1e-12);
        assert_relative_eq!(result[1], 2.0_f64.exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_subspace_is_clipped_and_zero_vector() {
        let a = tridiagonal(3);
        let b = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let basis = KrylovBasis::build(&a, &b, 10, DEFAULT_KRYLOV_TOLERANCE);
        assert!(basis.dim() <= 3);

        let zero = DVector::zeros(3);
        let result = KrylovExpm::new(2).unwrap().apply(&a, &zero).unwrap();
        assert_eq!(result, DVector::zeros(3));
    }

    #[test]
    fn test_configuration_errors() {
        assert!(KrylovExpm::new(0).is_err());
        assert!(KrylovExpm::new(3).unwrap().with_tolerance(-1.0).is_err());

        let a = DMatrix::zeros(2, 2);
        let b = DVector::zeros(3);
        assert!(KrylovExpm::new(2).unwrap().apply(&a, &b).is_err());
    }
}
