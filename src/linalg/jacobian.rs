//! Finite-difference Jacobian
//!
//! Central differences, one column per state component:
//!
//! ```text
//! J[:, j] ≈ (f(y + ε e_j) - f(y - ε e_j)) / 2ε
//! ```
//!
//! Columns are independent, so above [`parallel_threshold`] they are
//! evaluated on the Rayon pool (feature `parallel`).

use nalgebra::{DMatrix, DVector};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::PieResult;
use crate::solver::parallel_threshold;

/// Central finite-difference Jacobian of `f` at `y`
///
/// `epsilon` is the absolute perturbation applied to each component.
///
/// # Errors
///
/// Propagates the first error returned by `f`.
pub fn numerical_jacobian<F>(f: F, y: &DVector<f64>, epsilon: f64) -> PieResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> PieResult<DVector<f64>> + Sync,
{
    let dim = y.len();
    if dim == 0 {
        return Ok(DMatrix::zeros(0, 0));
    }

    let column = |j: usize| -> PieResult<DVector<f64>> {
        let mut shifted = y.clone();
        shifted[j] = y[j] + epsilon;
        let forward = f(&shifted)?;
        shifted[j] = y[j] - epsilon;
        let backward = f(&shifted)?;
        Ok((forward - backward) / (2.0 * epsilon))
    };

    let columns: Vec<DVector<f64>> = if dim >= parallel_threshold() {
        #[cfg(feature = "parallel")]
        {
            (0..dim).into_par_iter().map(column).collect::<PieResult<_>>()?
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..dim).map(column).collect::<PieResult<_>>()?
        }
    } else {
        (0..dim).map(column).collect::<PieResult<_>>()?
    };

    Ok(DMatrix::from_columns(&columns))
}
