//! Full multigrid driver shared by the linear and nonlinear cycles

use super::relaxation::{MultigridBase, Problem};
use crate::error::Result;
use log::{debug, info, warn};

/// Whether a multigrid pass ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// The pass ran to completion
    Completed,
    /// No source term was provided; nothing was done
    SourceNotSet,
}

/// Outcome of [`MultigridCycle::solve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Status of the initial full multigrid pass
    pub status: CycleStatus,
    /// Finest-level cycles run after the full multigrid pass
    pub cycles: usize,
    /// Final RMS residual on the finest level
    pub residual_norm: f64,
    /// Whether the residual dropped below the residual tolerance
    pub converged: bool,
}

/// A multigrid algorithm built on a [`MultigridBase`]
pub trait MultigridCycle {
    type Problem: Problem;

    fn base(&self) -> &MultigridBase<Self::Problem>;

    fn base_mut(&mut self) -> &mut MultigridBase<Self::Problem>;

    /// One full multigrid pass: solve on the coarsest grid, then interpolate
    /// and cycle on each finer level in turn
    ///
    /// Does nothing and reports [`CycleStatus::SourceNotSet`] when no source
    /// has been provided.
    fn multigrid(&mut self) -> Result<CycleStatus>;

    /// `cycle_type` correction cycles with `level` as the fine grid
    fn cycle(&mut self, level: usize) -> Result<()>;

    /// Full multigrid, then finest-level cycles until the RMS residual is
    /// below `residual_tolerance` or `maximum_iterations` cycles have run
    ///
    /// Running out of cycles is not an error; check
    /// [`SolveReport::converged`].
    fn solve(&mut self) -> Result<SolveReport> {
        let status = self.multigrid()?;
        let finest = self.base().finest_level();
        let tolerance = self.base().settings().residual_tolerance;
        let max_cycles = self.base().settings().maximum_iterations;

        let mut residual_norm = self.base().residual_norm(finest);
        if status == CycleStatus::SourceNotSet {
            return Ok(SolveReport {
                status,
                cycles: 0,
                residual_norm,
                converged: false,
            });
        }

        let mut cycles = 0;
        while residual_norm >= tolerance && cycles < max_cycles {
            self.cycle(finest)?;
            self.base_mut().solution[finest].update_boundaries();
            cycles += 1;
            residual_norm = self.base().residual_norm(finest);
            debug!("Cycle {cycles}: residual {residual_norm:.3e}");
        }

        let converged = residual_norm < tolerance;
        if converged {
            info!("Converged after {cycles} cycles, residual {residual_norm:.3e}");
        } else {
            warn!(
                "No convergence after {cycles} cycles, residual {residual_norm:.3e} (tolerance {tolerance:.1e})"
            );
        }

        Ok(SolveReport {
            status,
            cycles,
            residual_norm,
            converged,
        })
    }
}

/// Log and report a skipped pass
pub(super) fn source_not_set() -> CycleStatus {
    warn!("Multigrid pass skipped: source term not set");
    CycleStatus::SourceNotSet
}
