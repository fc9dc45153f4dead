//! Duct flow problems built on the multigrid engine
//!
//! - [`PoissonProblem`]: Newtonian flow, `∇²u = -1`
//! - [`MosolovFlow`]: Bingham flow by augmented Lagrangian iteration

mod mosolov;
mod poisson;

pub use mosolov::*;
pub use poisson::*;
