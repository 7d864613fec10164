//! Lagrange interpolation basis
//!
//! For distinct points `x_0, …, x_{p-1}` the i-th basis polynomial is
//!
//! ```text
//! L_i(x) = Π_{j ≠ i} (x - x_j) / (x_i - x_j)        L_i(x_j) = δ_ij
//! ```
//!
//! Nodal values on one point set are mapped to another one through the
//! extrapolation matrix `E[j, i] = L_i(new_j)`, and differentiated through
//! `D[i, j] = L_j'(x_i)`. Both matrices are built once per operator.
//!
//! Duplicate points make the denominators vanish. The scalar functions then
//! return non-finite values; the matrix builders reject them up front.

use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};

/// Value of the `i`-th Lagrange basis polynomial on `points` at `x`
pub fn basis_value(x: f64, points: &[f64], i: usize) -> f64 {
    let xi = points[i];
    points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &xj)| (x - xj) / (xi - xj))
        .product()
}

/// Derivative of the `i`-th Lagrange basis polynomial on `points` at `x`
///
/// Sum over `k ≠ i` of the products of `(x - x_j)` for `j ∉ {i, k}`, divided
/// by `Π_{j ≠ i} (x_i - x_j)`. Unlike the logarithmic-derivative form, this is
/// exact when `x` coincides with one of the points.
pub fn basis_derivative(x: f64, points: &[f64], i: usize) -> f64 {
    let xi = points[i];
    let others: Vec<f64> = points
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .map(|(_, &xj)| xj)
        .collect();

    let numerator: f64 = (0..others.len())
        .map(|k| {
            others
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != k)
                .map(|(_, &xj)| x - xj)
                .product::<f64>()
        })
        .sum();
    let denominator: f64 = others.iter().map(|&xj| xi - xj).product();

    numerator / denominator
}

/// Change of basis from nodal values on `points` to nodal values on `new_points`
///
/// Returns a `new_points.len() × points.len()` matrix with
/// `E[j, i] = L_i(new_points[j])`.
///
/// # Errors
///
/// `InvalidConfiguration` when `points` is empty or contains duplicates.
pub fn extrapolation_matrix(points: &[f64], new_points: &[f64]) -> PieResult<DMatrix<f64>> {
    check_distinct(points)?;
    Ok(DMatrix::from_fn(new_points.len(), points.len(), |j, i| {
        basis_value(new_points[j], points, i)
    }))
}

/// Differentiation matrix on `points`: `D[i, j] = L_j'(points[i])`
///
/// # Errors
///
/// `InvalidConfiguration` when `points` is empty or contains duplicates.
pub fn derivative_matrix(points: &[f64]) -> PieResult<DMatrix<f64>> {
    check_distinct(points)?;
    let n = points.len();
    Ok(DMatrix::from_fn(n, n, |i, j| {
        basis_derivative(points[i], points, j)
    }))
}

/// Evaluate the interpolating polynomial of `values` on `points` at `x`
///
/// # Errors
///
/// `DimensionMismatch` when `values` and `points` differ in length.
pub fn interpolate(points: &[f64], values: &DVector<f64>, x: f64) -> PieResult<f64> {
    if values.len() != points.len() {
        return Err(PieError::dimension(points.len(), values.len(), "interpolation values"));
    }
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, v)| v * basis_value(x, points, i))
        .sum())
}

fn check_distinct(points: &[f64]) -> PieResult<()> {
    if points.is_empty() {
        return Err(PieError::InvalidConfiguration {
            reason: "Lagrange basis needs at least one point".to_string(),
        });
    }
    for (i, a) in points.iter().enumerate() {
        if points[i + 1..].iter().any(|b| a == b) {
            return Err(PieError::InvalidConfiguration {
                reason: format!("duplicate interpolation point {a}"),
            });
        }
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::linalg::quadrature::chebyshev_nodes;

    #[test]
    fn test_kronecker_property() {
        let points = chebyshev_nodes(4);

        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(basis_value(points[j], &points, i), expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_partition_of_unity() {
        let points = [-1.0, -0.2, 0.5, 1.0];
        let x = 0.3;

        let sum: f64 = (0..4).map(|i| basis_value(x, &points, i)).sum();
        let dsum: f64 = (0..4).map(|i| basis_derivative(x, &points, i)).sum();

        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(dsum, 0.0, epsilon = 1e-13);
    }

    #[test]
    fn test_derivative_matrix_is_exact_on_polynomials() {
        // p(x) = x³ - 2x sampled on 4 points, derivative 3x² - 2
        let points = chebyshev_nodes(4);
        let values = DVector::from_iterator(4, points.iter().map(|x| x * x * x - 2.0 * x));

        let d = derivative_matrix(&points).unwrap();
        let derivative = &d * &values;

        for (i, x) in points.iter().enumerate() {
            assert_abs_diff_eq!(derivative[i], 3.0 * x * x - 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_extrapolation_matrix_shape_and_values() {
        let points = [-0.5, 0.5];
        let new_points = [-1.0, 0.0, 1.0];
        let e = extrapolation_matrix(&points, &new_points).unwrap();

        assert_eq!(e.shape(), (3, 2));
        // Linear interpolant of (-0.5, 0.5) evaluated at -1: 1.5 * y0 - 0.5 * y1
        assert_abs_diff_eq!(e[(0, 0)], 1.5, epsilon = 1e-15);
        assert_abs_diff_eq!(e[(0, 1)], -0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(e[(1, 0)], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_interpolate() {
        let points = [0.0, 1.0, 2.0];
        let values = DVector::from_vec(vec![0.0, 1.0, 4.0]);

        assert_abs_diff_eq!(interpolate(&points, &values, 1.5).unwrap(), 2.25, epsilon = 1e-14);
        assert!(interpolate(&points, &DVector::zeros(2), 0.0).is_err());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        assert!(extrapolation_matrix(&[0.0, 0.0], &[1.0]).is_err());
        assert!(derivative_matrix(&[]).is_err());
    }

    #[test]
    fn test_single_point_basis_is_constant() {
        assert_eq!(basis_value(0.7, &[0.0], 0), 1.0);
        assert_eq!(basis_derivative(0.7, &[0.0], 0), 0.0);
    }
}
