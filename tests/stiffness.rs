//! Stiff problems: implicit and exponential integrators against explicit ones

use nalgebra::DVector;
use pie_rs::linalg::{expm_action, KrylovExpm};
use pie_rs::solver::{Bdf, ExplicitRungeKutta, ExponentialIntegrator, TimeGrid};
use pie_rs::spatial::{FiniteDifferenceOperator, Gaussian, Mesh, SpatialOperator, SpectralDifferenceOperator};

mod common;
use common::{max_error, run, stiff_decay};

#[test]
fn test_backward_euler_is_bounded_where_forward_euler_diverges() {
    let grid = TimeGrid::uniform(0.0, 1.0, 10).unwrap();
    let y0 = DVector::from_element(1, 1.0);

    let implicit = run(&Bdf::new(1).unwrap(), &stiff_decay(), &y0, &grid);
    assert!(implicit.state_trajectory.iter().all(|y| y[0].abs() <= 1.0));
    assert!(implicit.final_state[0].abs() < 1e-10);

    let explicit = run(&ExplicitRungeKutta::euler(), &stiff_decay(), &y0, &grid);
    assert!(explicit.final_state[0].abs() > 1e10);
}

#[test]
fn test_bdf_handles_stiff_diffusion() {
    // Diffusion number d·dt/dx² = 125
    let mesh = Mesh::uniform(0.0, 1.0, 50).unwrap();
    let op = FiniteDifferenceOperator::new(mesh, 1, 0.0, 0.25).unwrap();
    let y0 = op.initial_state(&Gaussian { length: 1.0 });
    let grid = TimeGrid::uniform(0.0, 2.0, 10).unwrap();

    let result = run(&Bdf::new(1).unwrap(), &op, &y0, &grid);
    let mean = y0.mean();

    // Relaxes to the mean without leaving the initial range
    assert!(result.final_state.iter().all(|y| (y - mean).abs() < 1e-3));
    assert!(result.state_trajectory.iter().all(|y| y.max() <= y0.max() + 1e-12));
    assert!(result.state_trajectory.iter().all(|y| y.min() >= -1e-12));
}

#[test]
fn test_krylov_converges_to_dense_exponential_on_an_operator() {
    let mesh = Mesh::uniform(0.0, 1.0, 8).unwrap();
    let op = SpectralDifferenceOperator::new(mesh, 3, 1.0, 0.005).unwrap();
    let y0 = op.initial_state(&Gaussian { length: 1.0 });
    let a = op.jacobian() * 0.05;

    let dense = expm_action(&a, &y0).unwrap();
    let errors: Vec<f64> = [2, 4, 8, 16]
        .iter()
        .map(|&k| max_error(&KrylovExpm::new(k).unwrap().apply(&a, &y0).unwrap(), &dense))
        .collect();

    for pair in errors.windows(2) {
        assert!(pair[1] < pair[0], "errors not decreasing: {errors:?}");
    }
    let full = KrylovExpm::new(op.n_points()).unwrap().apply(&a, &y0).unwrap();
    assert!(max_error(&full, &dense) < 1e-8);
}

#[test]
fn test_exponential_integrator_takes_large_steps() {
    // Exact for a linear operator whatever the step size
    let mesh = Mesh::uniform(0.0, 1.0, 10).unwrap();
    let op = SpectralDifferenceOperator::new(mesh, 2, 1.0, 0.01).unwrap();
    let y0 = op.initial_state(&Gaussian { length: 1.0 });

    let one_step = TimeGrid::uniform(0.0, 0.5, 1).unwrap();
    let many_steps = TimeGrid::uniform(0.0, 0.5, 50).unwrap();

    let solver = ExponentialIntegrator::taylor(1).unwrap();
    let a = run(&solver, &op, &y0, &one_step);
    let b = run(&solver, &op, &y0, &many_steps);
    assert!(max_error(&a.final_state, &b.final_state) < 1e-9);

    let krylov = solver.with_krylov(op.n_points() + 1).unwrap();
    let c = run(&krylov, &op, &y0, &one_step);
    assert!(max_error(&a.final_state, &c.final_state) < 1e-8);
}
