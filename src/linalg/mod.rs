//! Linear algebra building blocks
//!
//! Dense helpers shared by the spatial operators and the temporal integrators:
//!
//! - **`lagrange`**: Lagrange basis, extrapolation and differentiation matrices
//! - **`quadrature`**: Chebyshev solution nodes and Legendre roots
//! - **`krylov`**: Krylov approximation of `exp(A)·b`
//! - **`expm`**: Dense exponential action and the φ₁ function
//! - **`jacobian`**: Central finite-difference Jacobian
//!
//! Everything works on `nalgebra::{DMatrix, DVector}` of `f64`.

pub mod expm;
pub mod jacobian;
pub mod krylov;
pub mod lagrange;
pub mod quadrature;

pub use expm::{expm_action, phi_1, phi_1_scalar};
pub use jacobian::numerical_jacobian;
pub use krylov::{KrylovBasis, KrylovExpm};
pub use lagrange::{
    basis_derivative, basis_value, derivative_matrix, extrapolation_matrix, interpolate,
};
pub use quadrature::{chebyshev_nodes, flux_points, legendre_roots};

use nalgebra::DMatrix;

/// Block-diagonal matrix with `blocks[i]` as its i-th diagonal block
///
/// Blocks may be rectangular: the result has `Σ rows` rows and `Σ cols` columns.
pub fn block_diagonal(blocks: &[DMatrix<f64>]) -> DMatrix<f64> {
    let rows = blocks.iter().map(|b| b.nrows()).sum();
    let cols = blocks.iter().map(|b| b.ncols()).sum();
    let mut full = DMatrix::zeros(rows, cols);

    let (mut r, mut c) = (0, 0);
    for block in blocks {
        full.view_mut((r, c), block.shape()).copy_from(block);
        r += block.nrows();
        c += block.ncols();
    }
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_diagonal_rectangular() {
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let b = DMatrix::from_row_slice(2, 1, &[3.0, 4.0]);
        let full = block_diagonal(&[a, b]);

        assert_eq!(full.shape(), (4, 2));
        assert_eq!(full[(1, 0)], 2.0);
        assert_eq!(full[(2, 1)], 3.0);
        assert_eq!(full[(2, 0)], 0.0);
        assert_eq!(full[(0, 1)], 0.0);
    }
}
