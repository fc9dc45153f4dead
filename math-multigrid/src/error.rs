//! Error types for the multigrid engine
//!
//! Library errors use `thiserror`; every fallible operation in the crate
//! returns [`Result`].

use crate::boundary::BoundaryFlag;
use thiserror::Error;

/// Errors raised by fields, boundary conditions, transfers and settings.
#[derive(Debug, Error)]
pub enum MultigridError {
    /// A boundary sequence does not match the length of the edge it targets.
    #[error("boundary length mismatch on {edge} edge: expected {expected} points, got {actual}")]
    BoundaryLengthMismatch {
        /// Edge being assigned
        edge: BoundaryFlag,
        /// Current length of the edge
        expected: usize,
        /// Length of the supplied sequence
        actual: usize,
    },

    /// A boundary point cannot be applied (non-finite value, bad stride).
    #[error("invalid boundary condition on {edge} edge at position {index}: {reason}")]
    InvalidBoundaryCondition {
        /// Edge being assigned
        edge: BoundaryFlag,
        /// Position along the edge
        index: usize,
        /// Why the assignment was rejected
        reason: String,
    },

    /// Two fields do not have the resolutions an operation requires.
    #[error("resolution mismatch in {operation}: expected {expected:?}, got {actual:?}")]
    ResolutionMismatch {
        /// Operation that detected the mismatch
        operation: &'static str,
        /// Required `(nx, nz)`
        expected: (usize, usize),
        /// Supplied `(nx, nz)`
        actual: (usize, usize),
    },

    /// A grid is too coarse for the requested operation.
    #[error("{operation} needs at least {minimum} points per axis, grid is {nx}x{nz}")]
    ResolutionTooSmall {
        /// Operation that was requested
        operation: &'static str,
        /// Points along x
        nx: usize,
        /// Points along z
        nz: usize,
        /// Minimum points per axis
        minimum: usize,
    },

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Reading or writing a settings/export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for multigrid operations.
pub type Result<T> = std::result::Result<T, MultigridError>;

impl MultigridError {
    /// Returns `true` for errors raised while assigning boundary conditions.
    pub fn is_boundary_error(&self) -> bool {
        matches!(
            self,
            MultigridError::BoundaryLengthMismatch { .. }
                | MultigridError::InvalidBoundaryCondition { .. }
        )
    }

    /// Returns `true` for errors caused by incompatible or undersized grids.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            MultigridError::ResolutionMismatch { .. } | MultigridError::ResolutionTooSmall { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = MultigridError::BoundaryLengthMismatch {
            edge: BoundaryFlag::Left,
            expected: 5,
            actual: 4,
        };
        assert!(err.is_boundary_error());
        assert!(!err.is_resolution_error());

        let err = MultigridError::ResolutionTooSmall {
            operation: "integral",
            nx: 4,
            nz: 7,
            minimum: 8,
        };
        assert!(err.is_resolution_error());
        assert!(!err.is_boundary_error());
    }

    #[test]
    fn test_error_messages() {
        let err = MultigridError::BoundaryLengthMismatch {
            edge: BoundaryFlag::Top,
            expected: 9,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("top"));
        assert!(msg.contains("expected 9"));
        assert!(msg.contains("got 3"));
    }
}
