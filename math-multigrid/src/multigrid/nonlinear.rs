//! Full approximation scheme (FAS) multigrid for nonlinear problems
//!
//! Every level carries a full approximation of the solution. The coarse
//! source is corrected by the truncation error `τ = L(R u) - R(L u)` so the
//! coarse problem reproduces the fine solution. The restricted approximation
//! `R u` has the coarse boundary conditions enforced in both strokes, so the
//! correction vanishes once the fine solution has converged.

use super::cycle::{CycleStatus, MultigridCycle, source_not_set};
use super::hierarchy::GridHierarchy;
use super::relaxation::{MultigridBase, Problem, evaluate_operator};
use crate::error::Result;
use crate::field::ScalarField;
use crate::settings::Settings;
use log::debug;
use std::ops::{Deref, DerefMut};

/// Nonlinear full multigrid solver
#[derive(Debug)]
pub struct NonlinearMultigrid<P> {
    base: MultigridBase<P>,
    trunc_error: GridHierarchy,
}

impl<P: Problem> NonlinearMultigrid<P> {
    pub fn new(problem: P, settings: Settings) -> Result<Self> {
        let trunc_error = GridHierarchy::new(&settings)?;
        Ok(Self {
            base: MultigridBase::new(problem, settings)?,
            trunc_error,
        })
    }

    /// Truncation error `τ` on coarse `level` from the most recent downstroke
    pub fn truncation_error(&self, level: usize) -> &ScalarField {
        &self.trunc_error[level]
    }

    fn fas_cycle(&mut self, fine_level: usize) -> Result<()> {
        let Settings {
            pre_relax_count,
            post_relax_count,
            residual_tolerance,
            ..
        } = self.base.settings;
        let base = &mut self.base;
        let trunc_error = &mut self.trunc_error;

        for level in (1..=fine_level).rev() {
            base.relax(level, pre_relax_count);

            // τ = L(R u) - R(L u)
            base.operator_into_temp(level)?;
            base.temp.coarsen(level)?;
            base.solution.coarsen(level)?;
            base.solution[level - 1].update_boundaries();
            evaluate_operator(
                &base.problem,
                level - 1,
                &base.solution[level - 1],
                &mut trunc_error[level - 1],
            )?;
            trunc_error[level - 1].sub_field(&base.temp[level - 1])?;

            // f(2h) = R f(h) + τ
            base.source.coarsen(level)?;
            base.source[level - 1].add_field(&trunc_error[level - 1])?;
        }

        base.relax_to_tolerance(0, residual_tolerance);

        // u(h) += I(u(2h) - R u(h))
        for level in 1..=fine_level {
            base.solution.coarsen_into(level, &mut base.temp[level - 1])?;
            base.temp[level - 1]
                .update_boundaries_with(base.solution[level - 1].boundary_conditions());
            base.solution[level - 1].sub_field(&base.temp[level - 1])?;
            base.solution.refine_into(level - 1, &mut base.temp[level])?;
            base.solution[level].add_field(&base.temp[level])?;
            base.relax(level, post_relax_count);
        }
        Ok(())
    }
}

impl<P: Problem> MultigridCycle for NonlinearMultigrid<P> {
    type Problem = P;

    fn base(&self) -> &MultigridBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MultigridBase<P> {
        &mut self.base
    }

    fn multigrid(&mut self) -> Result<CycleStatus> {
        if !self.base.is_source_set() {
            return Ok(source_not_set());
        }
        let finest = self.base.finest_level();
        let tolerance = self.base.settings.residual_tolerance;

        for level in (1..=finest).rev() {
            self.base.solution.coarsen(level)?;
            self.base.source.coarsen(level)?;
        }
        let coarse = self.base.relax_to_tolerance(0, tolerance);
        debug!("Coarsest solve: {} sweeps", coarse.sweeps);

        for fine_level in 1..=finest {
            self.base.solution.refine(fine_level - 1)?;
            self.cycle(fine_level)?;
        }

        let post = self.base.settings.post_relax_count;
        self.base.relax(finest, post);
        self.base.solution[finest].update_boundaries();
        Ok(CycleStatus::Completed)
    }

    fn cycle(&mut self, level: usize) -> Result<()> {
        for _ in 0..self.base.settings.cycle_type.count() {
            self.fas_cycle(level)?;
        }
        Ok(())
    }
}

impl<P> Deref for NonlinearMultigrid<P> {
    type Target = MultigridBase<P>;

    fn deref(&self) -> &MultigridBase<P> {
        &self.base
    }
}

impl<P> DerefMut for NonlinearMultigrid<P> {
    fn deref_mut(&mut self) -> &mut MultigridBase<P> {
        &mut self.base
    }
}
