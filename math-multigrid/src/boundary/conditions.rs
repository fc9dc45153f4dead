//! Boundary condition sets: one [`BoundaryEdge`] per side of the rectangle

use super::edge::aliased_length;
use super::{BoundaryEdge, BoundaryFlag, BoundaryPoint};
use crate::error::{MultigridError, Result};

/// Boundary conditions for all four edges of a grid
///
/// Invariant: `left`/`right` hold `nz` points and `top`/`bottom` hold `nx`
/// points for the grid the set is attached to.
///
/// Cloning produces an independent deep copy; aliasing is only ever created
/// explicitly through [`BoundaryConditions::alias`].
#[derive(Debug, Default)]
pub struct BoundaryConditions {
    edges: [BoundaryEdge; 4],
}

impl Clone for BoundaryConditions {
    fn clone(&self) -> Self {
        Self {
            edges: std::array::from_fn(|k| self.edges[k].detached_copy()),
        }
    }
}

impl BoundaryConditions {
    /// Zero-Dirichlet conditions sized for an `nx` x `nz` grid
    pub fn new(nx: usize, nz: usize) -> Self {
        let mut conditions = Self::default();
        conditions.resize(nx, nz);
        conditions
    }

    /// Conditions initialised with [`BoundaryConditions::apply_default_conditions`]
    pub fn with_default_conditions(nx: usize, nz: usize) -> Self {
        let mut conditions = Self::default();
        conditions.apply_default_conditions(nx, nz);
        conditions
    }

    /// Edge view for `flag`
    pub fn edge(&self, flag: BoundaryFlag) -> &BoundaryEdge {
        &self.edges[flag.index()]
    }

    /// Mutable edge view for `flag`
    pub fn edge_mut(&mut self, flag: BoundaryFlag) -> &mut BoundaryEdge {
        &mut self.edges[flag.index()]
    }

    /// Snapshot of the points on `flag`
    pub fn get(&self, flag: BoundaryFlag) -> Vec<BoundaryPoint> {
        self.edge(flag).to_vec()
    }

    /// Number of points on `flag`
    pub fn len(&self, flag: BoundaryFlag) -> usize {
        self.edge(flag).len()
    }

    /// Set edge lengths: `top`/`bottom` to `nx`, `left`/`right` to `nz`
    pub fn resize(&mut self, nx: usize, nz: usize) {
        for flag in BoundaryFlag::ALL {
            self.edge_mut(flag).resize(flag.edge_length(nx, nz));
        }
    }

    /// Copy a full sequence of points onto `flag`
    ///
    /// Fails with [`MultigridError::BoundaryLengthMismatch`] when
    /// `points.len()` differs from the edge length, and with
    /// [`MultigridError::InvalidBoundaryCondition`] when a value is not finite.
    /// Nothing is written on failure.
    pub fn set(&mut self, flag: BoundaryFlag, points: &[BoundaryPoint]) -> Result<()> {
        let expected = self.len(flag);
        if points.len() != expected {
            return Err(MultigridError::BoundaryLengthMismatch {
                edge: flag,
                expected,
                actual: points.len(),
            });
        }
        for (index, point) in points.iter().enumerate() {
            validate_point(flag, index, point)?;
        }
        self.edge_mut(flag).assign(points);
        Ok(())
    }

    /// Broadcast one point across every position of `flag`
    pub fn set_uniform(&mut self, flag: BoundaryFlag, point: BoundaryPoint) -> Result<()> {
        validate_point(flag, 0, &point)?;
        self.edge_mut(flag).fill(point);
        Ok(())
    }

    /// Make `flag` a strided view into the same edge of `other`
    ///
    /// The view must have exactly the current edge length, otherwise
    /// [`MultigridError::BoundaryLengthMismatch`] is returned and the edge is
    /// left untouched.
    pub fn alias(
        &mut self,
        flag: BoundaryFlag,
        other: &BoundaryConditions,
        stride: usize,
    ) -> Result<()> {
        if stride == 0 {
            return Err(MultigridError::InvalidBoundaryCondition {
                edge: flag,
                index: 0,
                reason: "alias stride must be positive".to_string(),
            });
        }
        let expected = self.len(flag);
        let actual = aliased_length(other.len(flag), stride);
        if actual != expected {
            return Err(MultigridError::BoundaryLengthMismatch {
                edge: flag,
                expected,
                actual,
            });
        }
        self.edge_mut(flag).alias(other.edge(flag), stride);
        Ok(())
    }

    /// Alias all four edges into `other` with the same stride
    pub fn alias_all(&mut self, other: &BoundaryConditions, stride: usize) -> Result<()> {
        for flag in BoundaryFlag::ALL {
            self.alias(flag, other, stride)?;
        }
        Ok(())
    }

    /// Whether every edge views the storage of the matching edge in `other`
    pub fn is_aliased_to(&self, other: &BoundaryConditions) -> bool {
        BoundaryFlag::ALL
            .iter()
            .all(|&flag| self.edge(flag).shares_storage_with(other.edge(flag)))
    }

    /// Zero-Neumann on left and top, zero-Dirichlet on right and bottom
    pub fn apply_default_conditions(&mut self, nx: usize, nz: usize) {
        self.resize(nx, nz);
        self.edge_mut(BoundaryFlag::Left)
            .fill(BoundaryPoint::ZERO_NEUMANN);
        self.edge_mut(BoundaryFlag::Right)
            .fill(BoundaryPoint::ZERO_DIRICHLET);
        self.edge_mut(BoundaryFlag::Top)
            .fill(BoundaryPoint::ZERO_NEUMANN);
        self.edge_mut(BoundaryFlag::Bottom)
            .fill(BoundaryPoint::ZERO_DIRICHLET);
    }
}

fn validate_point(flag: BoundaryFlag, index: usize, point: &BoundaryPoint) -> Result<()> {
    if point.value.is_finite() {
        Ok(())
    } else {
        Err(MultigridError::InvalidBoundaryCondition {
            edge: flag,
            index,
            reason: format!("value {} is not finite", point.value),
        })
    }
}
