//! Properties of the finite-difference grid machinery
//!
//! Derivative exactness on polynomials, transfer operators, hierarchy shape
//! and boundary condition sharing across levels.

use approx::assert_relative_eq;
use math_multigrid::boundary::{BoundaryConditions, BoundaryFlag, BoundaryPoint, ConditionType};
use math_multigrid::multigrid::{GridHierarchy, MultigridBase, coarsest_resolution};
use math_multigrid::{MultigridError, PoissonOperator, ScalarField, Settings, VectorField};

fn settings(aspect: f64, grids: usize) -> Settings {
    Settings {
        aspect_ratio: aspect,
        number_of_grids: grids,
        ..Default::default()
    }
}

#[test]
fn test_constant_field_has_zero_derivatives() {
    let mut u = ScalarField::new(2.0, 9, 7);
    u.fill(3.5);
    for i in 0..u.nx() {
        for j in 0..u.nz() {
            let d = u.derivatives(i, j);
            assert_relative_eq!(d.dx, 0.0, epsilon = 1e-10);
            assert_relative_eq!(d.dz, 0.0, epsilon = 1e-10);
            assert_relative_eq!(d.dxx, 0.0, epsilon = 1e-8);
            assert_relative_eq!(d.dzz, 0.0, epsilon = 1e-8);
            assert_relative_eq!(d.dxz, 0.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_linear_field_derivatives_everywhere() {
    let (alpha, beta, gamma) = (1.5, -0.75, 0.2);
    for (nx, nz) in [(9, 5), (3, 4), (2, 6)] {
        let mut u = ScalarField::new(1.5, nx, nz);
        u.fill_with(|x, z| alpha * x + beta * z + gamma);
        for i in 0..nx {
            for j in 0..nz {
                assert_relative_eq!(u.dx(i, j), alpha, epsilon = 1e-10);
                assert_relative_eq!(u.dz(i, j), beta, epsilon = 1e-10);
                assert_relative_eq!(u.dxz(i, j), 0.0, epsilon = 1e-8);
                if nx > 2 {
                    assert_relative_eq!(u.dxx(i, j), 0.0, epsilon = 1e-8);
                }
                if nz > 2 {
                    assert_relative_eq!(u.dzz(i, j), 0.0, epsilon = 1e-8);
                }
            }
        }
    }
}

#[test]
fn test_quadratic_second_derivatives() {
    let mut u = ScalarField::new(1.0, 11, 11);
    u.fill_with(|x, z| x * x - 2.0 * z * z + x * z);
    for i in 0..11 {
        for j in 0..11 {
            assert_relative_eq!(u.dxx(i, j), 2.0, epsilon = 1e-8);
            assert_relative_eq!(u.dzz(i, j), -4.0, epsilon = 1e-8);
            assert_relative_eq!(u.dxz(i, j), 1.0, epsilon = 1e-8);
        }
    }
}

#[test]
fn test_gradient_and_divergence_of_linear_fields() {
    let mut u = ScalarField::new(2.0, 9, 5);
    u.fill_with(|x, z| 3.0 * x - z);
    let mut gradient = VectorField::new(2.0, 9, 5);
    u.gradient(&mut gradient).unwrap();
    assert!(gradient.first().values().iter().all(|&g| (g - 3.0).abs() < 1e-10));
    assert!(gradient.second().values().iter().all(|&g| (g + 1.0).abs() < 1e-10));

    let mut div = ScalarField::new(2.0, 9, 5);
    gradient.divergence(&mut div).unwrap();
    assert!(div.values().iter().all(|&d| d.abs() < 1e-8));

    let mut wrong = VectorField::new(2.0, 5, 5);
    assert!(matches!(
        u.gradient(&mut wrong),
        Err(MultigridError::ResolutionMismatch { .. })
    ));
}

#[test]
fn test_integral_of_polynomial() {
    let mut u = ScalarField::new(2.0, 17, 9);
    u.fill_with(|x, z| x * x * z);
    // ∫₀² x² dx ∫₀¹ z dz = 8/3 · 1/2
    assert_relative_eq!(u.integral().unwrap(), 4.0 / 3.0, epsilon = 1e-10);

    let small = ScalarField::new(1.0, 7, 9);
    assert!(matches!(
        small.integral(),
        Err(MultigridError::ResolutionTooSmall { minimum: 8, .. })
    ));
}

#[test]
fn test_restrict_then_prolong_reproduces_constant() {
    let mut h = GridHierarchy::new(&settings(1.0, 4)).unwrap();
    let finest = h.finest_level();
    h[finest].fill(2.25);

    for level in (1..=finest).rev() {
        h.coarsen(level).unwrap();
    }
    assert!(h[0].values().iter().all(|&v| (v - 2.25).abs() < 1e-12));

    for level in 1..=finest {
        h[level].fill(0.0);
    }
    for level in 0..finest {
        h.refine(level).unwrap();
    }
    assert!(h[finest].values().iter().all(|&v| (v - 2.25).abs() < 1e-12));
}

#[test]
fn test_transfer_rejects_incompatible_levels() {
    let h = GridHierarchy::new(&settings(1.0, 3)).unwrap();
    let mut wrong = ScalarField::new(1.0, 5, 5);
    assert!(matches!(
        h.coarsen_into(2, &mut wrong),
        Err(MultigridError::ResolutionMismatch { .. })
    ));
}

#[test]
fn test_hierarchy_for_wide_domain() {
    assert_eq!(coarsest_resolution(4.0, 4), (7, 4));

    let h = GridHierarchy::new(&settings(4.0, 4)).unwrap();
    assert_eq!(h.num_levels(), 4);
    assert_eq!(h[0].shape(), (7, 4));
    assert_eq!(h[1].shape(), (13, 7));
    assert_eq!(h[2].shape(), (25, 13));
    assert_eq!(h.finest().shape(), (49, 25));
}

#[test]
fn test_relax_zero_sweeps_is_identity() {
    let mut engine = MultigridBase::new(PoissonOperator, settings(1.0, 3)).unwrap();
    let mut guess = ScalarField::zeros_like(engine.result());
    guess.fill_with(|x, z| (x + 1.0) * (2.0 - z));
    engine.set_initial_guess(&guess).unwrap();

    let finest = engine.finest_level();
    engine.relax(finest, 0);
    assert_eq!(engine.result().values(), guess.values());
}

#[test]
fn test_zero_dirichlet_boundaries_after_update() {
    let mut u = ScalarField::new(1.0, 6, 9);
    u.fill(7.0);
    u.update_boundaries();

    let (nx, nz) = u.shape();
    for i in 0..nx {
        assert_eq!(u[(i, 0)], 0.0);
        assert_eq!(u[(i, nz - 1)], 0.0);
    }
    for j in 0..nz {
        assert_eq!(u[(0, j)], 0.0);
        assert_eq!(u[(nx - 1, j)], 0.0);
    }
    assert_eq!(u[(2, 3)], 7.0);
}

#[test]
fn test_neumann_boundary_reproduces_derivative() {
    let mut u = ScalarField::new(1.0, 9, 9);
    u.fill_with(|x, _| 2.0 * x + 1.0);
    u.boundary_conditions_mut()
        .set_uniform(BoundaryFlag::Left, BoundaryPoint::neumann(2.0))
        .unwrap();
    u.boundary_conditions_mut()
        .set_uniform(BoundaryFlag::Right, BoundaryPoint::neumann(2.0))
        .unwrap();
    u.boundary_conditions_mut()
        .set_uniform(BoundaryFlag::Top, BoundaryPoint::neumann(0.0))
        .unwrap();
    u.boundary_conditions_mut()
        .set_uniform(BoundaryFlag::Bottom, BoundaryPoint::neumann(0.0))
        .unwrap();

    let expected = u.clone();
    u[(0, 4)] = -10.0;
    u[(8, 4)] = 10.0;
    u.update_boundaries();

    for j in 1..8 {
        assert_relative_eq!(u[(0, j)], expected[(0, j)], epsilon = 1e-12);
        assert_relative_eq!(u[(8, j)], expected[(8, j)], epsilon = 1e-12);
    }
}

#[test]
fn test_wrong_boundary_length_is_rejected() {
    let mut bc = BoundaryConditions::with_default_conditions(9, 17);
    let points = vec![BoundaryPoint::ZERO_NEUMANN; 9];
    let err = bc.set(BoundaryFlag::Left, &points).unwrap_err();
    assert!(matches!(
        err,
        MultigridError::BoundaryLengthMismatch {
            edge: BoundaryFlag::Left,
            expected: 17,
            actual: 9,
        }
    ));
    assert!(err.is_boundary_error());
    // The edge is left untouched
    assert!(bc.get(BoundaryFlag::Left).iter().all(|p| *p == BoundaryPoint::ZERO_NEUMANN));
}

#[test]
fn test_non_finite_boundary_value_is_rejected() {
    let mut bc = BoundaryConditions::with_default_conditions(5, 5);
    let err = bc
        .set_uniform(BoundaryFlag::Top, BoundaryPoint::dirichlet(f64::NAN))
        .unwrap_err();
    assert!(matches!(err, MultigridError::InvalidBoundaryCondition { .. }));
}

#[test]
fn test_finest_boundary_edits_visible_on_every_level() {
    let mut h = GridHierarchy::new(&settings(1.0, 3)).unwrap();
    let finest = h.finest_level();
    let n = h.boundary_conditions().len(BoundaryFlag::Bottom);
    let points: Vec<BoundaryPoint> = (0..n)
        .map(|k| {
            if k > 5 {
                BoundaryPoint::dirichlet(k as f64)
            } else {
                BoundaryPoint::neumann(k as f64)
            }
        })
        .collect();
    h.boundary_conditions_mut()
        .set(BoundaryFlag::Bottom, &points)
        .unwrap();

    for level in 0..=finest {
        let stride = 1 << (finest - level);
        let seen = h[level].boundary_conditions().get(BoundaryFlag::Bottom);
        assert_eq!(seen.len(), h[level].nx());
        for (k, point) in seen.iter().enumerate() {
            assert_eq!(*point, points[k * stride]);
        }
    }
    let coarse = h[0].boundary_conditions().get(BoundaryFlag::Bottom);
    assert_eq!(coarse[1].condition_type, ConditionType::Neumann);
    assert_eq!(coarse[2].condition_type, ConditionType::Dirichlet);
    assert_eq!(coarse[2].value, 8.0);
}
