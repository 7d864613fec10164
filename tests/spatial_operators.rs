//! Contracts shared by the spatial operators

use approx::assert_relative_eq;
use nalgebra::DVector;
use pie_rs::linalg::numerical_jacobian;
use pie_rs::spatial::{
    interface_flux, interface_state, FiniteDifferenceBurgers, FiniteDifferenceOperator, Mesh, SpatialOperator,
    SpectralDifferenceBurgers, SpectralDifferenceOperator,
};
use pie_rs::system::OdeSystem;

fn meshes() -> Vec<Mesh> {
    vec![
        Mesh::uniform(0.0, 2.0, 7).unwrap(),
        Mesh::new(vec![0.0, 0.15, 0.4, 0.45, 0.8, 1.0]).unwrap(),
    ]
}

/// Deterministic, non-smooth test state
fn state(op: &dyn SpatialOperator) -> DVector<f64> {
    DVector::from_iterator(
        op.n_points(),
        op.coordinates().iter().enumerate().map(|(i, x)| (3.0 * x).sin() + 0.3 * (i % 3) as f64),
    )
}

#[test]
fn test_linear_operators_are_their_jacobian() {
    for mesh in meshes() {
        for p in 1..=4 {
            for (c, d) in [(1.0, 0.0), (-0.7, 0.05), (0.0, 0.2)] {
                let fd = FiniteDifferenceOperator::new(mesh.clone(), p, c, d).unwrap();
                let sd = SpectralDifferenceOperator::new(mesh.clone(), p, c, d).unwrap();

                for op in [&fd as &dyn SpatialOperator, &sd] {
                    let y = state(op);
                    let rhs = op.rhs(&y, 0.3).unwrap();
                    let jy = op.jac(&y, 0.3).unwrap() * &y;
                    assert_relative_eq!(rhs, jy, epsilon = 1e-10);
                }
            }
        }
    }
}

#[test]
fn test_burgers_jacobians_match_finite_differences() {
    for mesh in meshes() {
        let fd = FiniteDifferenceBurgers::new(mesh.clone(), 2, 0.01).unwrap();
        let sd = SpectralDifferenceBurgers::new(mesh.clone(), 3, 0.01).unwrap();

        for op in [&fd as &dyn SpatialOperator, &sd] {
            let y = state(op);
            let analytic = op.jac(&y, 0.0).unwrap();
            let numeric = numerical_jacobian(|v| op.rhs(v, 0.0), &y, 1e-7).unwrap();
            assert_relative_eq!(analytic, numeric, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_every_operator_reports_its_hessian() {
    let mesh = Mesh::uniform(0.0, 1.0, 4).unwrap();
    let ops: Vec<Box<dyn SpatialOperator>> = vec![
        Box::new(FiniteDifferenceOperator::new(mesh.clone(), 2, 1.0, 0.1).unwrap()),
        Box::new(SpectralDifferenceOperator::new(mesh.clone(), 2, 1.0, 0.1).unwrap()),
        Box::new(FiniteDifferenceBurgers::new(mesh.clone(), 2, 0.1).unwrap()),
        Box::new(SpectralDifferenceBurgers::new(mesh, 2, 0.1).unwrap()),
    ];

    for op in &ops {
        assert!(op.provides_jacobian(), "{}", op.name());
        assert!(op.provides_hessian(), "{}", op.name());
        let hess = op.hess(&state(op.as_ref()), 0.0).unwrap();
        assert_eq!(hess.dim(), op.dim());
    }
}

#[test]
fn test_constant_states_are_steady() {
    for mesh in meshes() {
        let ops: Vec<Box<dyn SpatialOperator>> = vec![
            Box::new(FiniteDifferenceOperator::new(mesh.clone(), 3, 0.9, 0.02).unwrap()),
            Box::new(SpectralDifferenceOperator::new(mesh.clone(), 3, 0.9, 0.02).unwrap()),
            Box::new(FiniteDifferenceBurgers::new(mesh.clone(), 3, 0.02).unwrap()),
            Box::new(SpectralDifferenceBurgers::new(mesh, 3, 0.02).unwrap()),
        ];
        for op in &ops {
            let y = DVector::from_element(op.dim(), -1.5);
            assert!(op.rhs(&y, 0.0).unwrap().amax() < 1e-9, "{} is not steady", op.name());
        }
    }
}

#[test]
fn test_riemann_literal_cases() {
    // Shock, positive side upstream
    assert_eq!(interface_state(2.0, 1.0), 2.0);
    assert_relative_eq!(interface_flux(2.0, 1.0), -2.0);
    // Rarefaction through zero
    assert_eq!(interface_state(-1.0, 1.0), 0.0);
    assert_relative_eq!(interface_flux(-1.0, 1.0), 0.0);
    // Continuous state
    assert_eq!(interface_state(3.0, 3.0), 3.0);
    assert_relative_eq!(interface_flux(3.0, 3.0), -4.5);
}

#[test]
fn test_cfl_helpers_are_consistent() {
    let mesh = Mesh::new(vec![0.0, 0.1, 0.3, 0.6, 1.0]).unwrap();
    let op = SpectralDifferenceOperator::new(mesh, 3, 2.0, 0.0).unwrap();

    let dt = op.time_step(0.8, 2.0).unwrap();
    assert_relative_eq!(op.cfl_number(2.0, dt), 0.8, epsilon = 1e-14);
    assert!(op.time_step(0.8, 0.0).is_err());
}
