//! Geometric multigrid on rectangular finite-difference grids
//!
//! Provides the grid hierarchy, full-weighting restriction and bilinear
//! prolongation, red-black relaxation, and two full multigrid algorithms:
//! a correction scheme for linear problems and FAS for nonlinear ones.

mod cycle;
mod hierarchy;
mod linear;
mod nonlinear;
mod relaxation;
mod transfer;

pub use cycle::{CycleStatus, MultigridCycle, SolveReport};
pub use hierarchy::*;
pub use linear::*;
pub use nonlinear::*;
pub use relaxation::{MultigridBase, Problem, RelaxReport};
pub use transfer::*;
