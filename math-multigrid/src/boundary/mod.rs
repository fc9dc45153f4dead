//! Boundary conditions for rectangular finite-difference grids
//!
//! Every grid edge carries an ordered sequence of [`BoundaryPoint`]s, each
//! either a Dirichlet value or a Neumann derivative:
//! - Dirichlet: u = g on the boundary point
//! - Neumann: ∂u/∂x (left/right) or ∂u/∂z (top/bottom) = h on the boundary point
//!
//! Edges are [`BoundaryEdge`] views into shared storage, so a coarse grid can
//! alias every `2^k`-th point of the canonical finest-level edge.

mod conditions;
mod edge;

pub use conditions::*;
pub use edge::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of constraint applied at a boundary point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionType {
    /// Fixed value
    #[default]
    Dirichlet,
    /// Fixed derivative along the axis normal to the edge
    Neumann,
}

/// A single boundary constraint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryPoint {
    /// Dirichlet or Neumann
    pub condition_type: ConditionType,
    /// Prescribed value (Dirichlet) or derivative (Neumann)
    pub value: f64,
}

impl BoundaryPoint {
    /// u = 0
    pub const ZERO_DIRICHLET: BoundaryPoint = BoundaryPoint::dirichlet(0.0);
    /// ∂u/∂n = 0
    pub const ZERO_NEUMANN: BoundaryPoint = BoundaryPoint::neumann(0.0);

    pub const fn dirichlet(value: f64) -> Self {
        Self {
            condition_type: ConditionType::Dirichlet,
            value,
        }
    }

    pub const fn neumann(value: f64) -> Self {
        Self {
            condition_type: ConditionType::Neumann,
            value,
        }
    }
}

/// Edge of the rectangular domain
///
/// `Left`/`Right` are the `i = 0` / `i = nx-1` columns and run along z;
/// `Top`/`Bottom` are the `j = 0` / `j = nz-1` rows and run along x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryFlag {
    Left,
    Right,
    Top,
    Bottom,
}

impl BoundaryFlag {
    /// All edges, in the order boundary updates are applied
    pub const ALL: [BoundaryFlag; 4] = [
        BoundaryFlag::Left,
        BoundaryFlag::Right,
        BoundaryFlag::Top,
        BoundaryFlag::Bottom,
    ];

    /// Number of points along this edge for an `nx` x `nz` grid
    pub fn edge_length(self, nx: usize, nz: usize) -> usize {
        match self {
            BoundaryFlag::Left | BoundaryFlag::Right => nz,
            BoundaryFlag::Top | BoundaryFlag::Bottom => nx,
        }
    }

    fn index(self) -> usize {
        match self {
            BoundaryFlag::Left => 0,
            BoundaryFlag::Right => 1,
            BoundaryFlag::Top => 2,
            BoundaryFlag::Bottom => 3,
        }
    }
}

impl fmt::Display for BoundaryFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryFlag::Left => "left",
            BoundaryFlag::Right => "right",
            BoundaryFlag::Top => "top",
            BoundaryFlag::Bottom => "bottom",
        };
        f.write_str(name)
    }
}
