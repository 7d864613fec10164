//! Reference point sets on `[-1, 1]`
//!
//! - Solution points: Chebyshev-Gauss nodes `-cos(π (2i + 1) / 2p)`, ascending
//! - Flux points: `-1`, the roots of the Legendre polynomial `P_{p-1}`, `1`

use std::f64::consts::PI;

/// Newton iterations allowed per Legendre root
const MAX_NEWTON_ITERATIONS: usize = 100;

/// `p` Chebyshev-Gauss nodes in increasing order
pub fn chebyshev_nodes(p: usize) -> Vec<f64> {
    (0..p)
        .map(|i| -(PI * (2 * i + 1) as f64 / (2 * p) as f64).cos())
        .collect()
}

/// Roots of the Legendre polynomial `P_n`, in increasing order
///
/// Newton iteration started from the asymptotic estimate
/// `-cos(π (i + 3/4) / (n + 1/2))`, which lies in the basin of the i-th root.
pub fn legendre_roots(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let mut x = -(PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            for _ in 0..MAX_NEWTON_ITERATIONS {
                let (p, dp) = legendre(n, x);
                let step = p / dp;
                x -= step;
                if step.abs() <= f64::EPSILON * x.abs().max(1.0) {
                    break;
                }
            }
            x
        })
        .collect()
}

/// `p + 1` flux points: the cell ends and the `p - 1` interior Legendre roots
pub fn flux_points(p: usize) -> Vec<f64> {
    let mut points = Vec::with_capacity(p + 1);
    points.push(-1.0);
    points.extend(legendre_roots(p.saturating_sub(1)));
    points.push(1.0);
    points
}

/// `(P_n(x), P_n'(x))` through the three-term recurrence
fn legendre(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let (mut previous, mut current) = (1.0, x);
    for k in 1..n {
        let k = k as f64;
        let next = ((2.0 * k + 1.0) * x * current - k * previous) / (k + 1.0);
        previous = current;
        current = next;
    }
    // Roots are interior, so 1 - x² never vanishes on the Newton path
    let derivative = n as f64 * (previous - x * current) / (1.0 - x * x);
    (current, derivative)
}
