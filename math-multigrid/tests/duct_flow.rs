//! End-to-end validation of the multigrid solvers
//!
//! Compares the duct flow solutions against the series solution of the
//! Poisson problem and checks the nonlinear (FAS) solver against the linear
//! one and against an exactly representable solution.

use approx::assert_relative_eq;
use math_multigrid::boundary::{BoundaryConditions, BoundaryFlag, BoundaryPoint};
use math_multigrid::{
    CycleStatus, LinearMultigrid, MosolovFlow, MosolovSettings, MultigridCycle,
    NonlinearMultigrid, PoissonOperator, PoissonProblem, Problem, Result, ScalarField, Settings,
};
use std::f64::consts::PI;

/// Flow rate through the quarter duct `[0, a] x [0, 1]` for `∇²u = -1`,
/// symmetric on `x = 0` and `z = 0`, no slip elsewhere
fn quarter_duct_flux(aspect: f64) -> f64 {
    let mut sum = 0.0;
    for m in (1..400).step_by(2) {
        for n in (1..400).step_by(2) {
            let (m, n) = (m as f64, n as f64);
            sum += 1.0 / (m * m * n * n * (m * m / (aspect * aspect) + n * n));
        }
    }
    256.0 * aspect / PI.powi(6) * sum
}

fn settings(aspect: f64, grids: usize) -> Settings {
    Settings {
        aspect_ratio: aspect,
        number_of_grids: grids,
        ..Default::default()
    }
}

/// `∇²u - u³ = -1`, zero Dirichlet on every edge
struct CubicReaction;

impl Problem for CubicReaction {
    fn differential_operator(&self, _level: usize, u: &ScalarField, i: usize, j: usize) -> f64 {
        let value = u[(i, j)];
        u.dxx(i, j) + u.dzz(i, j) - value * value * value
    }

    fn relaxation_updater(
        &self,
        level: usize,
        u: &mut ScalarField,
        f: &ScalarField,
        i: usize,
        j: usize,
    ) {
        // One Newton step on the local equation
        let residual = f[(i, j)] - self.differential_operator(level, u, i, j);
        let value = u[(i, j)];
        let jacobian = u.dxxu(i) + u.dzzu(j) - 3.0 * value * value;
        u[(i, j)] += residual / jacobian;
    }

    fn boundary_conditions(&self, conditions: &mut BoundaryConditions) -> Result<()> {
        for flag in BoundaryFlag::ALL {
            conditions.set_uniform(flag, BoundaryPoint::ZERO_DIRICHLET)?;
        }
        Ok(())
    }

    fn source_term(&self, source: &mut ScalarField) -> bool {
        source.fill(-1.0);
        true
    }
}

/// Plain Laplacian with zero Dirichlet edges and no built-in source
struct DirichletLaplacian;

impl Problem for DirichletLaplacian {
    fn differential_operator(&self, level: usize, u: &ScalarField, i: usize, j: usize) -> f64 {
        PoissonOperator.differential_operator(level, u, i, j)
    }

    fn relaxation_updater(
        &self,
        level: usize,
        u: &mut ScalarField,
        f: &ScalarField,
        i: usize,
        j: usize,
    ) {
        PoissonOperator.relaxation_updater(level, u, f, i, j)
    }

    fn boundary_conditions(&self, conditions: &mut BoundaryConditions) -> Result<()> {
        for flag in BoundaryFlag::ALL {
            conditions.set_uniform(flag, BoundaryPoint::ZERO_DIRICHLET)?;
        }
        Ok(())
    }
}

#[test]
fn test_series_flux() {
    // Known value for the square duct: total flux 0.5623 over [-1, 1]²
    assert_relative_eq!(4.0 * quarter_duct_flux(1.0), 0.5623, epsilon = 1e-3);
}

#[test]
fn test_poisson_duct_matches_series_solution() {
    let mut settings = settings(1.0, 5);
    settings.residual_tolerance = 1e-10;
    settings.maximum_iterations = 400;
    let mut problem = PoissonProblem::new(settings).unwrap();
    assert_eq!(problem.result().shape(), (49, 97));

    let report = problem.solve().unwrap();
    assert_eq!(report.status, CycleStatus::Completed);
    assert!(report.converged, "residual {}", report.residual_norm);
    assert!(report.residual_norm < 1e-10);
    assert!(report.cycles <= 400);

    let flux = problem.flux().unwrap();
    assert_relative_eq!(flux, quarter_duct_flux(1.0), max_relative = 0.01);

    // Velocity peaks on the symmetry corner and vanishes on the walls
    let u = problem.result();
    let (nx, nz) = u.shape();
    assert!(u[(0, 0)] > u[(nx / 2, nz / 2)]);
    assert_eq!(u[(nx - 1, 0)], 0.0);
    assert_eq!(u[(0, nz - 1)], 0.0);
}

#[test]
fn test_wide_duct_flux() {
    let mut problem = PoissonProblem::new(settings(2.0, 4)).unwrap();
    let report = problem.solve().unwrap();
    assert!(report.converged);
    assert_relative_eq!(
        problem.flux().unwrap(),
        quarter_duct_flux(2.0),
        max_relative = 0.01
    );
}

#[test]
fn test_fas_matches_correction_scheme_on_linear_problem() {
    let mut linear = LinearMultigrid::new(PoissonOperator, settings(2.0, 4)).unwrap();
    let mut fas = NonlinearMultigrid::new(PoissonOperator, settings(2.0, 4)).unwrap();
    assert!(linear.solve().unwrap().converged);
    assert!(fas.solve().unwrap().converged);

    let difference = (linear.result().values() - fas.result().values())
        .iter()
        .fold(0.0f64, |acc, d| acc.max(d.abs()));
    assert!(difference < 1e-7, "max difference {difference}");
}

#[test]
fn test_fas_converges_with_four_point_coarsest_grid() {
    // Default minimum resolution: the coarsest grid has a 4-point axis where
    // Neumann closures reach the opposite wall
    for (aspect, grids) in [(1.0, 3), (2.0, 3), (4.0, 3)] {
        let mut linear = LinearMultigrid::new(PoissonOperator, settings(aspect, grids)).unwrap();
        let mut fas = NonlinearMultigrid::new(PoissonOperator, settings(aspect, grids)).unwrap();
        assert_eq!(fas.settings().minimum_resolution, 4);

        let linear_report = linear.solve().unwrap();
        let fas_report = fas.solve().unwrap();
        assert!(linear_report.converged);
        assert!(
            fas_report.converged,
            "aspect {aspect}: residual {} after {} cycles",
            fas_report.residual_norm, fas_report.cycles
        );
        assert!(fas_report.cycles < 400);

        let difference = (linear.result().values() - fas.result().values())
            .iter()
            .fold(0.0f64, |acc, d| acc.max(d.abs()));
        assert!(difference < 1e-7, "aspect {aspect}: max difference {difference}");
    }
}

#[test]
fn test_fas_solves_cubic_reaction() {
    let mut fas = NonlinearMultigrid::new(CubicReaction, settings(1.0, 4)).unwrap();
    let report = fas.solve().unwrap();
    assert!(report.converged, "residual {}", report.residual_norm);

    let mut linear = LinearMultigrid::new(DirichletLaplacian, settings(1.0, 4)).unwrap();
    linear.set_uniform_source(-1.0);
    assert!(linear.solve().unwrap().converged);

    // The reaction term only removes forcing
    let (nx, nz) = fas.result().shape();
    for i in 1..nx - 1 {
        for j in 1..nz - 1 {
            let u = fas.result()[(i, j)];
            assert!(u > 0.0);
            assert!(u <= linear.result()[(i, j)] + 1e-9);
        }
    }
    let centre = (nx / 2, nz / 2);
    assert!(fas.result()[centre] < linear.result()[centre]);
}

#[test]
fn test_fas_reproduces_quadratic_with_inhomogeneous_boundaries() {
    let exact = |x: f64, z: f64| x * x + 2.0 * z * z - x * z;
    let mut fas = NonlinearMultigrid::new(DirichletLaplacian, settings(1.0, 4)).unwrap();

    let geometry = *fas.result().geometry();
    let (nx, nz) = (geometry.nx, geometry.nz);
    let conditions = fas.solution_mut().boundary_conditions_mut();
    let left: Vec<_> = (0..nz)
        .map(|j| BoundaryPoint::dirichlet(exact(0.0, geometry.z(j))))
        .collect();
    let right: Vec<_> = (0..nz)
        .map(|j| BoundaryPoint::dirichlet(exact(geometry.x(nx - 1), geometry.z(j))))
        .collect();
    let top: Vec<_> = (0..nx)
        .map(|i| BoundaryPoint::dirichlet(exact(geometry.x(i), 0.0)))
        .collect();
    let bottom: Vec<_> = (0..nx)
        .map(|i| BoundaryPoint::dirichlet(exact(geometry.x(i), geometry.z(nz - 1))))
        .collect();
    conditions.set(BoundaryFlag::Left, &left).unwrap();
    conditions.set(BoundaryFlag::Right, &right).unwrap();
    conditions.set(BoundaryFlag::Top, &top).unwrap();
    conditions.set(BoundaryFlag::Bottom, &bottom).unwrap();

    // ∇²u = 2 + 4
    fas.set_uniform_source(6.0);
    let report = fas.solve().unwrap();
    assert!(report.converged, "residual {}", report.residual_norm);

    let mut expected = ScalarField::zeros_like(fas.result());
    expected.fill_with(exact);
    for (u, e) in fas.result().values().iter().zip(expected.values().iter()) {
        assert_relative_eq!(*u, *e, epsilon = 1e-8);
    }
}

#[test]
fn test_missing_source_is_reported_not_raised() {
    let mut solver = LinearMultigrid::new(DirichletLaplacian, settings(1.0, 3)).unwrap();
    assert!(!solver.is_source_set());
    assert_eq!(solver.multigrid().unwrap(), CycleStatus::SourceNotSet);

    let report = solver.solve().unwrap();
    assert_eq!(report.status, CycleStatus::SourceNotSet);
    assert_eq!(report.cycles, 0);
    assert!(!report.converged);
    assert!(solver.result().values().iter().all(|&v| v == 0.0));
}

#[test]
fn test_yield_stress_reduces_flux() {
    let base = MosolovSettings {
        multigrid: settings(2.0, 3),
        max_lagrange_iterations: 50,
        lagrange_tolerance: 1e-4,
        ..Default::default()
    };

    let mut newtonian = MosolovFlow::new(MosolovSettings {
        bingham_number: 0.0,
        ..base.clone()
    })
    .unwrap();
    let newtonian_report = newtonian.solve().unwrap();
    assert!(newtonian_report.iterations <= 50);
    assert!(newtonian_report.residual.is_finite());

    let mut bingham = MosolovFlow::new(MosolovSettings {
        bingham_number: 0.2,
        ..base
    })
    .unwrap();
    let bingham_report = bingham.solve().unwrap();

    let newtonian_flux = newtonian_report.flux.unwrap();
    let bingham_flux = bingham_report.flux.unwrap();
    assert!(newtonian_flux > 0.0);
    assert!(
        bingham_flux < newtonian_flux,
        "Bingham flux {bingham_flux} should be below Newtonian flux {newtonian_flux}"
    );
}
