//! Initial condition profiles
//!
//! An initial condition maps a coordinate to a value; [`InitialCondition::sample`]
//! evaluates it on the solution points of an operator. Any `Fn(f64) -> f64`
//! closure is an initial condition. The profiles below are defined on
//! `[0, length]`, with `u = x / length`.

use std::f64::consts::PI;

use nalgebra::DVector;

/// Source of an initial state
pub trait InitialCondition {
    /// Value at coordinate `x`
    fn evaluate(&self, x: f64) -> f64;

    /// Values at every coordinate
    fn sample(&self, coordinates: &[f64]) -> DVector<f64> {
        DVector::from_iterator(coordinates.len(), coordinates.iter().map(|&x| self.evaluate(x)))
    }
}

impl<F> InitialCondition for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}

/// `sin(2π · periods · u)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sine {
    pub length: f64,
    pub periods: u32,
}

impl InitialCondition for Sine {
    fn evaluate(&self, x: f64) -> f64 {
        (2.0 * PI * self.periods as f64 * x / self.length).sin()
    }
}

/// `exp(-200 (u - 1/2)²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    pub length: f64,
}

impl InitialCondition for Gaussian {
    fn evaluate(&self, x: f64) -> f64 {
        let u = x / self.length - 0.5;
        (-200.0 * u * u).exp()
    }
}

/// `sin(4π · periods · u)` on `1/4 < u < 3/4`, zero elsewhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimmedSine {
    pub length: f64,
    pub periods: u32,
}

impl InitialCondition for TrimmedSine {
    fn evaluate(&self, x: f64) -> f64 {
        let u = x / self.length;
        if u > 0.25 && u < 0.75 {
            (4.0 * PI * self.periods as f64 * u).sin()
        } else {
            0.0
        }
    }
}

/// `offset + 1` on `1/4 < u < 3/4`, `offset` elsewhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub length: f64,
    pub offset: f64,
}

impl InitialCondition for Rectangle {
    fn evaluate(&self, x: f64) -> f64 {
        let u = x / self.length;
        if u > 0.25 && u < 0.75 {
            self.offset + 1.0
        } else {
            self.offset
        }
    }
}
