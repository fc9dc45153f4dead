//! Correction-scheme multigrid for linear problems
//!
//! Coarse levels carry the error equation `L e = r` rather than the solution,
//! so every coarse solution is reset to zero on the way down. The coarse
//! levels share the finest level's boundary conditions, which is exact when
//! those are homogeneous.

use super::cycle::{CycleStatus, MultigridCycle, source_not_set};
use super::relaxation::{MultigridBase, Problem};
use crate::error::Result;
use crate::settings::Settings;
use log::debug;
use std::ops::{Deref, DerefMut};

/// Linear full multigrid solver
#[derive(Debug)]
pub struct LinearMultigrid<P> {
    base: MultigridBase<P>,
}

impl<P: Problem> LinearMultigrid<P> {
    pub fn new(problem: P, settings: Settings) -> Result<Self> {
        Ok(Self {
            base: MultigridBase::new(problem, settings)?,
        })
    }

    /// Downstroke from `fine_level`, exact coarse solve, upstroke
    fn correction_cycle(&mut self, fine_level: usize) -> Result<()> {
        let Settings {
            pre_relax_count,
            post_relax_count,
            residual_tolerance,
            ..
        } = self.base.settings;
        let base = &mut self.base;

        for level in (1..=fine_level).rev() {
            base.relax(level, pre_relax_count);
            base.residual_into_temp(level)?;
            base.temp.coarsen_into(level, &mut base.source[level - 1])?;
            base.solution[level - 1].fill(0.0);
        }

        base.relax_to_tolerance(0, residual_tolerance);

        for level in 1..=fine_level {
            base.solution.refine_into(level - 1, &mut base.temp[level])?;
            base.solution[level].add_field(&base.temp[level])?;
            base.relax(level, post_relax_count);
        }
        Ok(())
    }
}

impl<P: Problem> MultigridCycle for LinearMultigrid<P> {
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
            self.base.source.coarsen(level)?;
            self.base.solution.coarsen(level)?;
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
            self.correction_cycle(level)?;
        }
        Ok(())
    }
}

impl<P> Deref for LinearMultigrid<P> {
    type Target = MultigridBase<P>;

    fn deref(&self) -> &MultigridBase<P> {
        &self.base
    }
}

impl<P> DerefMut for LinearMultigrid<P> {
    fn deref_mut(&mut self) -> &mut MultigridBase<P> {
        &mut self.base
    }
}
