//! Common utilities for integration tests
#![allow(dead_code)]

pub mod mock_systems;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_systems::{cosine_forcing, exponential_growth, linear_decay, stiff_decay};
pub use test_helpers::{convergence_rate, l1_error, max_error, run};
