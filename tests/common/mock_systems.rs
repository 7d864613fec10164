//! Small ODE systems with known solutions

use nalgebra::{DMatrix, DVector};
use pie_rs::system::{Hessian, OdeProblem};

/// ẏ = y, y(t) = y0 eᵗ
pub fn exponential_growth() -> OdeProblem {
    linear_decay(-1.0).with_hessian(|_y, _t| Hessian::zeros(1))
}

/// ẏ = -k y with analytic Jacobian
pub fn linear_decay(rate: f64) -> OdeProblem {
    OdeProblem::new("linear decay", 1, move |y, _t| y * -rate)
        .with_jacobian(move |_y, _t| DMatrix::from_element(1, 1, -rate))
}

/// ẏ = -1000 y
pub fn stiff_decay() -> OdeProblem {
    linear_decay(1000.0)
}

/// ẏ = cos t, y(t) = y0 + sin t
pub fn cosine_forcing() -> OdeProblem {
    OdeProblem::new("cosine forcing", 1, |_y, t| DVector::from_element(1, t.cos()))
        .with_jacobian(|_y, _t| DMatrix::zeros(1, 1))
}
