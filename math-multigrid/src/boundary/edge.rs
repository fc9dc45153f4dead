//! Strided views over shared boundary storage

use super::BoundaryPoint;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One edge's boundary conditions
///
/// The points live in a shared buffer. An edge created with [`BoundaryEdge::new`]
/// owns its buffer (stride 1); [`BoundaryEdge::alias`] turns an edge into a
/// strided view of another edge's buffer, so writes through either side are
/// seen by both. The buffer is behind a lock: concurrent writers are
/// serialized.
///
/// `BoundaryEdge` is intentionally not `Clone`; use [`BoundaryEdge::detached_copy`]
/// for an independent copy.
#[derive(Debug)]
pub struct BoundaryEdge {
    points: Arc<RwLock<Vec<BoundaryPoint>>>,
    stride: usize,
    len: usize,
}

impl Default for BoundaryEdge {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BoundaryEdge {
    /// Owned edge of `len` zero-Dirichlet points
    pub fn new(len: usize) -> Self {
        Self::filled(len, BoundaryPoint::default())
    }

    /// Owned edge with every position set to `point`
    pub fn filled(len: usize, point: BoundaryPoint) -> Self {
        Self {
            points: Arc::new(RwLock::new(vec![point; len])),
            stride: 1,
            len,
        }
    }

    /// Owned edge holding a copy of `points`
    pub fn from_points(points: &[BoundaryPoint]) -> Self {
        Self {
            points: Arc::new(RwLock::new(points.to_vec())),
            stride: 1,
            len: points.len(),
        }
    }

    /// Number of points visible through this edge
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance between consecutive visible points in the underlying buffer
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether both edges view the same underlying buffer
    pub fn shares_storage_with(&self, other: &BoundaryEdge) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<BoundaryPoint>> {
        self.points.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<BoundaryPoint>> {
        self.points.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point at `index`
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn get(&self, index: usize) -> BoundaryPoint {
        assert!(index < self.len, "boundary index {index} out of range {}", self.len);
        self.read()[index * self.stride]
    }

    /// Snapshot of the visible points
    pub fn to_vec(&self) -> Vec<BoundaryPoint> {
        let points = self.read();
        (0..self.len).map(|k| points[k * self.stride]).collect()
    }

    /// Visit every visible point while holding a single read lock
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, BoundaryPoint),
    {
        let points = self.read();
        for k in 0..self.len {
            f(k, points[k * self.stride]);
        }
    }

    /// Overwrite the point at `index`
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn set_point(&mut self, index: usize, point: BoundaryPoint) {
        assert!(index < self.len, "boundary index {index} out of range {}", self.len);
        let stride = self.stride;
        self.write()[index * stride] = point;
    }

    /// Copy `points` position by position. Lengths must already agree.
    pub(crate) fn assign(&mut self, points: &[BoundaryPoint]) {
        debug_assert_eq!(points.len(), self.len);
        let stride = self.stride;
        let mut storage = self.write();
        for (k, point) in points.iter().enumerate() {
            storage[k * stride] = *point;
        }
    }

    /// Broadcast `point` across every visible position
    pub fn fill(&mut self, point: BoundaryPoint) {
        let (stride, len) = (self.stride, self.len);
        let mut storage = self.write();
        for k in 0..len {
            storage[k * stride] = point;
        }
    }

    /// Change the number of points.
    ///
    /// A no-op when the length is unchanged (an existing alias survives);
    /// otherwise the edge detaches into a fresh owned buffer of
    /// zero-Dirichlet points.
    pub fn resize(&mut self, len: usize) {
        if len == self.len {
            return;
        }
        *self = Self::new(len);
    }

    /// Make this edge a view of every `stride`-th point of `other`
    ///
    /// The resulting length is `(other.len() - 1) / stride + 1`.
    ///
    /// # Panics
    /// If `stride` is zero.
    pub fn alias(&mut self, other: &BoundaryEdge, stride: usize) {
        assert!(stride > 0, "boundary alias stride must be positive");
        self.points = Arc::clone(&other.points);
        self.stride = other.stride * stride;
        self.len = aliased_length(other.len, stride);
    }

    /// Independent owned copy of the visible points
    pub fn detached_copy(&self) -> Self {
        Self::from_points(&self.to_vec())
    }
}

/// Length of a stride-`stride` view into an edge of `len` points
pub(crate) fn aliased_length(len: usize, stride: usize) -> usize {
    if len == 0 { 0 } else { (len - 1) / stride + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_sees_parent_writes() {
        let mut fine = BoundaryEdge::new(9);
        let mut coarse = BoundaryEdge::new(5);
        coarse.alias(&fine, 2);

        assert_eq!(coarse.len(), 5);
        assert!(coarse.shares_storage_with(&fine));

        fine.set_point(4, BoundaryPoint::neumann(3.0));
        assert_eq!(coarse.get(2), BoundaryPoint::neumann(3.0));

        // Odd fine points are invisible to the coarse view
        fine.set_point(3, BoundaryPoint::dirichlet(7.0));
        assert!(coarse.to_vec().iter().all(|p| p.value != 7.0));
    }

    #[test]
    fn test_writes_through_alias_reach_parent() {
        let fine = BoundaryEdge::new(9);
        let mut coarse = BoundaryEdge::new(3);
        coarse.alias(&fine, 4);

        coarse.fill(BoundaryPoint::neumann(1.0));
        let points = fine.to_vec();
        assert_eq!(points[0], BoundaryPoint::neumann(1.0));
        assert_eq!(points[4], BoundaryPoint::neumann(1.0));
        assert_eq!(points[8], BoundaryPoint::neumann(1.0));
        assert_eq!(points[1], BoundaryPoint::ZERO_DIRICHLET);
    }

    #[test]
    fn test_alias_of_alias_composes_strides() {
        let fine = BoundaryEdge::new(17);
        let mut mid = BoundaryEdge::new(9);
        mid.alias(&fine, 2);
        let mut coarse = BoundaryEdge::new(5);
        coarse.alias(&mid, 2);

        assert_eq!(coarse.stride(), 4);
        assert_eq!(coarse.len(), 5);
    }

    #[test]
    fn test_resize_detaches() {
        let fine = BoundaryEdge::new(9);
        let mut coarse = BoundaryEdge::new(5);
        coarse.alias(&fine, 2);

        coarse.resize(5);
        assert!(coarse.shares_storage_with(&fine));

        coarse.resize(6);
        assert!(!coarse.shares_storage_with(&fine));
        assert_eq!(coarse.len(), 6);
        assert_eq!(coarse.stride(), 1);
    }

    #[test]
    fn test_detached_copy_is_independent() {
        let mut edge = BoundaryEdge::filled(4, BoundaryPoint::neumann(0.0));
        let copy = edge.detached_copy();
        edge.fill(BoundaryPoint::dirichlet(1.0));
        assert_eq!(copy.get(0), BoundaryPoint::neumann(0.0));
    }
}
