//! Red-black relaxation and residual evaluation
//!
//! [`MultigridBase`] owns the solution, source and scratch hierarchies and
//! drives a [`Problem`]'s pointwise callbacks over them. The cycles in
//! [`LinearMultigrid`](super::LinearMultigrid) and
//! [`NonlinearMultigrid`](super::NonlinearMultigrid) are built on it.

use super::hierarchy::GridHierarchy;
use crate::boundary::BoundaryConditions;
use crate::error::Result;
use crate::field::ScalarField;
use crate::settings::Settings;
use log::debug;

/// A discretised PDE `L(u) = f`, described point by point
pub trait Problem {
    /// `L(u)` at interior point `(i, j)` of `u` on `level`
    fn differential_operator(&self, level: usize, u: &ScalarField, i: usize, j: usize) -> f64;

    /// Update `u(i, j)` in place towards `L(u) = f` at interior point `(i, j)`
    fn relaxation_updater(
        &self,
        level: usize,
        u: &mut ScalarField,
        f: &ScalarField,
        i: usize,
        j: usize,
    );

    /// Configure the canonical boundary conditions of the solution
    ///
    /// Called once on construction, after the default conditions (zero
    /// Neumann left/top, zero Dirichlet right/bottom) have been applied.
    fn boundary_conditions(&self, _conditions: &mut BoundaryConditions) -> Result<()> {
        Ok(())
    }

    /// Fill the finest-level source term
    ///
    /// Returns `false` when the problem leaves the source to the caller.
    fn source_term(&self, _source: &mut ScalarField) -> bool {
        false
    }
}

impl<P: Problem + ?Sized> Problem for Box<P> {
    fn differential_operator(&self, level: usize, u: &ScalarField, i: usize, j: usize) -> f64 {
        (**self).differential_operator(level, u, i, j)
    }

    fn relaxation_updater(
        &self,
        level: usize,
        u: &mut ScalarField,
        f: &ScalarField,
        i: usize,
        j: usize,
    ) {
        (**self).relaxation_updater(level, u, f, i, j)
    }

    fn boundary_conditions(&self, conditions: &mut BoundaryConditions) -> Result<()> {
        (**self).boundary_conditions(conditions)
    }

    fn source_term(&self, source: &mut ScalarField) -> bool {
        (**self).source_term(source)
    }
}

/// Outcome of [`MultigridBase::relax_to_tolerance`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxReport {
    /// Sweeps performed
    pub sweeps: usize,
    /// `‖Δu‖ / ‖u‖` over the last sweep
    pub relative_change: f64,
    /// Whether the change dropped below the tolerance
    pub converged: bool,
}

/// Shared state and relaxation engine for the multigrid cycles
#[derive(Debug)]
pub struct MultigridBase<P> {
    pub(crate) problem: P,
    pub(crate) settings: Settings,
    pub(crate) solution: GridHierarchy,
    pub(crate) source: GridHierarchy,
    pub(crate) temp: GridHierarchy,
    source_set: bool,
    initial_set: bool,
}

impl<P: Problem> MultigridBase<P> {
    /// Build the hierarchies and let `problem` set boundaries and source
    pub fn new(problem: P, settings: Settings) -> Result<Self> {
        let mut solution = GridHierarchy::new(&settings)?;
        let mut source = GridHierarchy::new(&settings)?;
        let temp = GridHierarchy::new(&settings)?;

        problem.boundary_conditions(solution.boundary_conditions_mut())?;
        solution.relink_boundary_conditions()?;
        let source_set = problem.source_term(source.finest_mut());

        Ok(Self {
            problem,
            settings,
            solution,
            source,
            temp,
            source_set,
            initial_set: false,
        })
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn problem_mut(&mut self) -> &mut P {
        &mut self.problem
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn finest_level(&self) -> usize {
        self.solution.finest_level()
    }

    /// Solution hierarchy
    pub fn solution(&self) -> &GridHierarchy {
        &self.solution
    }

    /// Solution hierarchy, e.g. to edit its canonical boundary conditions
    pub fn solution_mut(&mut self) -> &mut GridHierarchy {
        &mut self.solution
    }

    /// Source hierarchy
    pub fn source(&self) -> &GridHierarchy {
        &self.source
    }

    /// Finest-level solution
    pub fn result(&self) -> &ScalarField {
        self.solution.finest()
    }

    /// Finest-level source term
    pub fn source_term(&self) -> &ScalarField {
        self.source.finest()
    }

    pub fn is_source_set(&self) -> bool {
        self.source_set
    }

    pub fn is_initial_guess_set(&self) -> bool {
        self.initial_set
    }

    /// Copy `guess` into the finest-level solution
    pub fn set_initial_guess(&mut self, guess: &ScalarField) -> Result<()> {
        self.solution.finest_mut().assign(guess)?;
        self.initial_set = true;
        Ok(())
    }

    /// Set the finest-level solution to a constant
    pub fn set_uniform_initial_guess(&mut self, value: f64) {
        self.solution.finest_mut().fill(value);
        self.initial_set = true;
    }

    /// Copy `source` into the finest-level source term
    pub fn set_source(&mut self, source: &ScalarField) -> Result<()> {
        self.source.finest_mut().assign(source)?;
        self.source_set = true;
        Ok(())
    }

    /// Set the finest-level source term to a constant
    pub fn set_uniform_source(&mut self, value: f64) {
        self.source.finest_mut().fill(value);
        self.source_set = true;
    }

    /// One red-black sweep over the interior of `level`, reporting each
    /// update as `(old, new)`
    fn sweep<F>(&mut self, level: usize, mut on_update: F)
    where
        F: FnMut(f64, f64),
    {
        let u = &mut self.solution[level];
        let f = &self.source[level];
        let (nx, nz) = u.shape();
        for color in 0..2 {
            for j in 1..nz.saturating_sub(1) {
                let start = 1 + (j + 1 + color) % 2;
                for i in (start..nx.saturating_sub(1)).step_by(2) {
                    let old = u[(i, j)];
                    self.problem.relaxation_updater(level, u, f, i, j);
                    on_update(old, u[(i, j)]);
                }
            }
        }
    }

    /// `sweeps` red-black sweeps on `level`, with a boundary update after each
    ///
    /// # Panics
    /// If `level` is past the finest level.
    pub fn relax(&mut self, level: usize, sweeps: usize) {
        for _ in 0..sweeps {
            self.sweep(level, |_, _| {});
            self.solution[level].update_boundaries();
        }
    }

    /// Sweep `level` until `‖Δu‖/‖u‖ < tolerance` or the iteration budget runs out
    ///
    /// A sweep that changes nothing counts as converged, even on a zero field.
    pub fn relax_to_tolerance(&mut self, level: usize, tolerance: f64) -> RelaxReport {
        let max_sweeps = self.settings.maximum_iterations;
        let mut report = RelaxReport {
            sweeps: 0,
            relative_change: f64::INFINITY,
            converged: false,
        };

        while report.sweeps < max_sweeps {
            let mut change = 0.0;
            let mut norm = 0.0;
            self.sweep(level, |old, new| {
                change += (new - old) * (new - old);
                norm += new * new;
            });
            self.solution[level].update_boundaries();
            report.sweeps += 1;

            report.relative_change = if change == 0.0 {
                0.0
            } else {
                change.sqrt() / norm.sqrt()
            };
            if report.relative_change < tolerance {
                report.converged = true;
                break;
            }
        }

        debug!(
            "Relaxed level {} in {} sweeps, relative change {:.3e}",
            level, report.sweeps, report.relative_change
        );
        report
    }

    /// `L(u)` on the interior of `level` into `dest`; boundary entries are zero
    pub fn evaluate_operator(&self, level: usize, dest: &mut ScalarField) -> Result<()> {
        evaluate_operator(&self.problem, level, &self.solution[level], dest)
    }

    /// `f - L(u)` on the interior of `level` into `dest`; boundary entries are zero
    pub fn evaluate_residual(&self, level: usize, dest: &mut ScalarField) -> Result<()> {
        evaluate_residual(
            &self.problem,
            level,
            &self.solution[level],
            &self.source[level],
            dest,
        )
    }

    /// Root-mean-square residual over all points of `level` (boundary counted as zero)
    pub fn residual_norm(&self, level: usize) -> f64 {
        let u = &self.solution[level];
        let f = &self.source[level];
        let (nx, nz) = u.shape();
        if nx * nz == 0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 1..nx.saturating_sub(1) {
            for j in 1..nz.saturating_sub(1) {
                let r = f[(i, j)] - self.problem.differential_operator(level, u, i, j);
                sum += r * r;
            }
        }
        (sum / (nx * nz) as f64).sqrt()
    }

    /// Residual into the scratch hierarchy at `level`
    pub(crate) fn residual_into_temp(&mut self, level: usize) -> Result<()> {
        evaluate_residual(
            &self.problem,
            level,
            &self.solution[level],
            &self.source[level],
            &mut self.temp[level],
        )
    }

    /// Operator into the scratch hierarchy at `level`
    pub(crate) fn operator_into_temp(&mut self, level: usize) -> Result<()> {
        evaluate_operator(
            &self.problem,
            level,
            &self.solution[level],
            &mut self.temp[level],
        )
    }
}

/// Apply `value(i, j)` over the interior of `dest` and zero its edges
fn fill_interior<F>(dest: &mut ScalarField, mut value: F)
where
    F: FnMut(usize, usize) -> f64,
{
    let (nx, nz) = dest.shape();
    for ((i, j), target) in dest.values_mut().indexed_iter_mut() {
        *target = if i == 0 || j == 0 || i + 1 == nx || j + 1 == nz {
            0.0
        } else {
            value(i, j)
        };
    }
}

pub(super) fn evaluate_operator<P: Problem + ?Sized>(
    problem: &P,
    level: usize,
    u: &ScalarField,
    dest: &mut ScalarField,
) -> Result<()> {
    u.check_shape("evaluate_operator", dest)?;
    fill_interior(dest, |i, j| problem.differential_operator(level, u, i, j));
    Ok(())
}

pub(super) fn evaluate_residual<P: Problem + ?Sized>(
    problem: &P,
    level: usize,
    u: &ScalarField,
    f: &ScalarField,
    dest: &mut ScalarField,
) -> Result<()> {
    u.check_shape("evaluate_residual", dest)?;
    fill_interior(dest, |i, j| {
        f[(i, j)] - problem.differential_operator(level, u, i, j)
    });
    Ok(())
}
