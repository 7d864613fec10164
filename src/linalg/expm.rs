//! Dense matrix exponential and φ₁
//!
//! `φ₁(z) = (e^z - 1) / z = Σ_{n≥0} zⁿ / (n+1)!`, extended to matrices as
//! `φ₁(Z) = (e^Z - I) Z⁻¹` when `Z` is well-conditioned. Singular or
//! ill-conditioned arguments fall back to the power series when `‖Z‖ ≤ 1`,
//! and otherwise to the top-right block of
//!
//! ```text
//! exp ┌ Z  I ┐ = ┌ e^Z  φ₁(Z) ┐
//!     └ 0  0 ┘   └  0     I   ┘
//! ```

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::error::{PieError, PieResult};

/// Relative size of the last series term at which the φ₁ series stops
const SERIES_TOLERANCE: f64 = 1e-12;

/// Cap on the number of series terms
const SERIES_MAX_TERMS: usize = 1000;

/// Frobenius condition number above which `Z⁻¹` is not trusted
const MAX_CONDITION: f64 = 1e10;

/// Dense `exp(a) · v`
///
/// # Errors
///
/// `DimensionMismatch` when `a` is not square of size `v.len()`.
pub fn expm_action(a: &DMatrix<f64>, v: &DVector<f64>) -> PieResult<DVector<f64>> {
    if a.nrows() != v.len() || a.ncols() != v.len() {
        return Err(PieError::dimension(v.len(), a.nrows().max(a.ncols()), "matrix exponential"));
    }
    Ok(a.clone().exp() * v)
}

/// Scalar φ₁, accurate near zero
pub fn phi_1_scalar(z: f64) -> f64 {
    if z.abs() < 1e-5 {
        1.0 + z / 2.0 + z * z / 6.0
    } else {
        z.exp_m1() / z
    }
}

/// Matrix φ₁
///
/// # Errors
///
/// `DimensionMismatch` when `z` is not square.
pub fn phi_1(z: &DMatrix<f64>) -> PieResult<DMatrix<f64>> {
    if !z.is_square() {
        return Err(PieError::dimension(z.nrows(), z.ncols(), "phi_1 argument"));
    }
    let n = z.nrows();

    if let Some(inverse) = z.clone().try_inverse()
        && inverse.iter().all(|x| x.is_finite())
        && z.norm() * inverse.norm() < MAX_CONDITION
    {
        let result = (z.clone().exp() - DMatrix::identity(n, n)) * inverse;
        if result.iter().all(|x| x.is_finite()) {
            return Ok(result);
        }
    }

    if z.norm() <= 1.0 {
        warn!("phi_1: {n}x{n} argument is singular, using the power series");
        Ok(phi_1_series(z))
    } else {
        warn!("phi_1: {n}x{n} argument is singular, using the block exponential");
        Ok(phi_1_block(z))
    }
}

/// Top-right block of `exp([[Z, I], [0, 0]])`
fn phi_1_block(z: &DMatrix<f64>) -> DMatrix<f64> {
    let n = z.nrows();
    let mut block = DMatrix::zeros(2 * n, 2 * n);
    block.view_mut((0, 0), (n, n)).copy_from(z);
    block.view_mut((0, n), (n, n)).fill_with_identity();
    block.exp().view((0, n), (n, n)).into_owned()
}

/// `Σ_{n≥0} Zⁿ / (n+1)!` summed until the last term is negligible
fn phi_1_series(z: &DMatrix<f64>) -> DMatrix<f64> {
    let n = z.nrows();
    let mut term = DMatrix::identity(n, n);
    let mut sum = DMatrix::identity(n, n);

    for i in 2..SERIES_MAX_TERMS + 2 {
        term = term * z / i as f64;
        sum += &term;

        let sum_norm = sum.norm();
        if sum_norm == 0.0 || term.norm() / sum_norm < SERIES_TOLERANCE {
            return sum;
        }
    }

    warn!("phi_1 series did not reach tolerance after {SERIES_MAX_TERMS} terms");
    sum
}
