//! Finite-difference full multigrid solver on rectangular grids
//!
//! This crate solves elliptic problems on an `[0, a] × [0, 1]` rectangle with
//! second-order finite differences and geometric multigrid.
//!
//! # Features
//!
//! - **Grid fields**: scalar and vector fields with one-sided stencils at the edges
//! - **Boundary conditions**: per-point Dirichlet or Neumann, shared across levels
//! - **Multigrid**: correction scheme for linear operators, FAS for nonlinear ones
//! - **Problems**: Poisson duct flow and Mosolov (Bingham) duct flow
//! - **Export**: JSON snapshots of the finest-level solution
//!
//! # Example
//!
//! ```ignore
//! use math_multigrid::{PoissonProblem, Settings};
//!
//! let settings = Settings { aspect_ratio: 2.0, ..Default::default() };
//! let mut problem = PoissonProblem::new(settings)?;
//! let report = problem.solve()?;
//! println!("flux = {}", problem.flux()?);
//! ```

pub mod boundary;
pub mod error;
pub mod export;
pub mod field;
pub mod multigrid;
pub mod problems;
pub mod settings;

pub use boundary::{BoundaryConditions, BoundaryFlag, BoundaryPoint, ConditionType};
pub use error::{MultigridError, Result};
pub use export::{FieldSnapshot, SnapshotContents};
pub use field::{Geometry, ScalarField, Stencil, VectorField};
pub use multigrid::{
    CycleStatus, GridHierarchy, LinearMultigrid, MultigridBase, MultigridCycle,
    NonlinearMultigrid, Problem, SolveReport,
};
pub use problems::{MosolovFlow, MosolovSettings, PoissonOperator, PoissonProblem};
pub use settings::{CycleType, Settings};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
