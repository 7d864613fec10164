//! Godunov Riemann solver for the inviscid Burgers flux
//!
//! At an interface with left state `yl` and right state `yr`, the exact
//! solution of `u_t + (u²/2)_x = 0` evaluated on the interface is
//!
//! | case                 | condition           | interface state |
//! |----------------------|---------------------|-----------------|
//! | uniform              | `yl == yr`          | `yl`            |
//! | shock moving right   | `yl > yr, yl+yr > 0`| `yl`            |
//! | shock moving left    | `yl > yr, yl+yr < 0`| `yr`            |
//! | stationary shock     | `yl > yr, yl+yr = 0`| `yl`            |
//! | rarefaction right    | `yl < yr, yl > 0`   | `yl`            |
//! | rarefaction left     | `yl < yr, yr < 0`   | `yr`            |
//! | sonic rarefaction    | `yl ≤ 0 ≤ yr`       | `0`             |
//!
//! A stationary shock carries the same flux `yl²/2 = yr²/2` on both sides
//! (Rankine-Hugoniot), so taking the left state is exact. The state is
//! continuous across the interface and the flux `-u²/2` is evaluated from it.

/// Which side supplies the interface state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upwind {
    /// Interface takes `yl`
    Left,

    /// Interface takes `yr`
    Right,

    /// Interface state is 0 (sonic point inside a rarefaction)
    Sonic,
}

impl Upwind {
    /// Interface state selected from `(yl, yr)`
    pub fn state(self, yl: f64, yr: f64) -> f64 {
        match self {
            Upwind::Left => yl,
            Upwind::Right => yr,
            Upwind::Sonic => 0.0,
        }
    }
}

/// Godunov selection for the interface `(yl, yr)`
pub fn upwind_side(yl: f64, yr: f64) -> Upwind {
    if yl > yr {
        // shock
        if yl + yr >= 0.0 {
            Upwind::Left
        } else {
            Upwind::Right
        }
    } else if yl < yr {
        // rarefaction
        if yl > 0.0 {
            Upwind::Left
        } else if yr < 0.0 {
            Upwind::Right
        } else {
            Upwind::Sonic
        }
    } else {
        Upwind::Left
    }
}

/// Interface state `u*(yl, yr)`
pub fn interface_state(yl: f64, yr: f64) -> f64 {
    upwind_side(yl, yr).state(yl, yr)
}

/// Interface flux `-u*²/2`, sign convention of `ẏ = ∂_x F`
pub fn interface_flux(yl: f64, yr: f64) -> f64 {
    let u = interface_state(yl, yr);
    -0.5 * u * u
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_cases() {
        assert_eq!(interface_state(2.0, 1.0), 2.0);
        assert_eq!(interface_state(-1.0, 1.0), 0.0);
        assert_eq!(interface_state(3.0, 3.0), 3.0);
    }

    #[test]
    fn test_shocks() {
        assert_eq!(upwind_side(1.0, -2.0), Upwind::Right);
        assert_eq!(interface_state(1.0, -2.0), -2.0);
        // Stationary shock: both sides carry the same flux
        assert_eq!(interface_state(2.0, -2.0), 2.0);
        assert_eq!(interface_flux(2.0, -2.0), -2.0);
    }

    #[test]
    fn test_rarefactions() {
        assert_eq!(interface_state(1.0, 2.0), 1.0);
        assert_eq!(interface_state(-2.0, -1.0), -1.0);
        assert_eq!(upwind_side(-1.0, 1.0), Upwind::Sonic);
        assert_eq!(interface_state(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_flux_matches_exact_riemann_solution() {
        // Exact solution on the interface x/t = 0 of the Burgers Riemann problem
        let exact = |yl: f64, yr: f64| -> f64 {
            if yl > yr {
                let speed = 0.5 * (yl + yr);
                if speed >= 0.0 { yl } else { yr }
            } else if yl >= 0.0 {
                yl
            } else if yr <= 0.0 {
                yr
            } else {
                0.0
            }
        };

        let samples = [-3.0, -1.5, -0.5, 0.0, 0.5, 1.5, 3.0];
        for &yl in &samples {
            for &yr in &samples {
                let u = exact(yl, yr);
                assert_eq!(interface_flux(yl, yr), -0.5 * u * u, "yl = {yl}, yr = {yr}");
            }
        }
    }
}
