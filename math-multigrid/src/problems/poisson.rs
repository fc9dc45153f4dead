//! Poisson flow in a rectangular duct: `∇²u = -1`

use crate::boundary::{BoundaryConditions, BoundaryFlag, BoundaryPoint};
use crate::error::Result;
use crate::export::{FieldSnapshot, SnapshotContents};
use crate::field::ScalarField;
use crate::multigrid::{LinearMultigrid, MultigridCycle, Problem, SolveReport};
use crate::settings::Settings;
use log::info;

/// The five-point Laplacian `L u = u_xx + u_zz`
///
/// Relaxation is pointwise Gauss-Seidel. The default setup models the
/// quarter duct: symmetry (zero Neumann) on the left and top, no slip (zero
/// Dirichlet) on the right and bottom, and a uniform forcing of `-1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoissonOperator;

impl Problem for PoissonOperator {
    fn differential_operator(&self, _level: usize, u: &ScalarField, i: usize, j: usize) -> f64 {
        u.dxx(i, j) + u.dzz(i, j)
    }

    fn relaxation_updater(
        &self,
        _level: usize,
        u: &mut ScalarField,
        f: &ScalarField,
        i: usize,
        j: usize,
    ) {
        let residual = f[(i, j)] - (u.dxx(i, j) + u.dzz(i, j));
        let diagonal = u.dxxu(i) + u.dzzu(j);
        u[(i, j)] += residual / diagonal;
    }

    fn boundary_conditions(&self, conditions: &mut BoundaryConditions) -> Result<()> {
        conditions.set_uniform(BoundaryFlag::Left, BoundaryPoint::ZERO_NEUMANN)?;
        conditions.set_uniform(BoundaryFlag::Right, BoundaryPoint::ZERO_DIRICHLET)?;
        conditions.set_uniform(BoundaryFlag::Top, BoundaryPoint::ZERO_NEUMANN)?;
        conditions.set_uniform(BoundaryFlag::Bottom, BoundaryPoint::ZERO_DIRICHLET)?;
        Ok(())
    }

    fn source_term(&self, source: &mut ScalarField) -> bool {
        source.fill(-1.0);
        true
    }
}

/// Poisson duct flow solved with linear multigrid
#[derive(Debug)]
pub struct PoissonProblem {
    solver: LinearMultigrid<PoissonOperator>,
}

impl PoissonProblem {
    pub fn new(settings: Settings) -> Result<Self> {
        let solver = LinearMultigrid::new(PoissonOperator, settings)?;
        info!(
            "Poisson problem: resolution {:?}, aspect {}",
            solver.result().shape(),
            solver.settings().aspect_ratio
        );
        Ok(Self { solver })
    }

    pub fn solver(&self) -> &LinearMultigrid<PoissonOperator> {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut LinearMultigrid<PoissonOperator> {
        &mut self.solver
    }

    /// Iterate to the residual tolerance
    pub fn solve(&mut self) -> Result<SolveReport> {
        self.solver.solve()
    }

    pub fn result(&self) -> &ScalarField {
        self.solver.result()
    }

    /// Integrated velocity over the domain
    pub fn flux(&self) -> Result<f64> {
        self.solver.result().integral()
    }

    /// File name stem identifying the run, e.g. `A2.0`
    pub fn file_stem(&self) -> String {
        format!("A{:.1}", self.solver.settings().aspect_ratio)
    }

    /// Finest-level fields for export
    pub fn snapshot(&self, contents: SnapshotContents) -> Result<FieldSnapshot> {
        FieldSnapshot::capture(self.solver.base(), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_updater_solves_local_equation() {
        let mut u = ScalarField::new(1.0, 5, 5);
        u.fill_with(|x, z| x * z + x);
        let mut f = ScalarField::new(1.0, 5, 5);
        f.fill(-1.0);

        PoissonOperator.relaxation_updater(0, &mut u, &f, 2, 2);
        let lu = PoissonOperator.differential_operator(0, &u, 2, 2);
        assert_relative_eq!(lu, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_file_stem() {
        let problem = PoissonProblem::new(Settings {
            aspect_ratio: 2.5,
            number_of_grids: 2,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(problem.file_stem(), "A2.5");
        assert!(problem.solver().is_source_set());
    }
}
