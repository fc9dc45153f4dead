//! Finite-difference fields on rectangular grids
//!
//! A [`ScalarField`] stores `nx * nz` values over `[0, aspect] x [0, 1]` and
//! evaluates derivatives point by point: centred second-order differences in
//! the interior, one-sided formulas on the edges. A [`VectorField`] pairs two
//! scalar fields on one geometry.

mod geometry;
mod scalar;
mod stencil;
mod vector;

pub use geometry::*;
pub use scalar::*;
pub use stencil::{Stencil, Weights, self_weight};
pub use vector::*;
