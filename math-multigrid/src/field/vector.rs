//! Two-component fields sharing one geometry

use super::{Geometry, ScalarField};
use crate::error::{MultigridError, Result};
use ndarray::{ArrayViewMut2, Zip};

/// A pair of scalar fields `(first, second)` on the same grid
///
/// Components can be read freely, but resizing only happens through the
/// vector field so both stay on the same geometry.
#[derive(Debug, Clone, Default)]
pub struct VectorField {
    first: ScalarField,
    second: ScalarField,
}

impl VectorField {
    pub fn new(aspect: f64, nx: usize, nz: usize) -> Self {
        Self {
            first: ScalarField::new(aspect, nx, nz),
            second: ScalarField::new(aspect, nx, nz),
        }
    }

    pub fn resize(&mut self, aspect: f64, nx: usize, nz: usize) {
        self.first.resize(aspect, nx, nz);
        self.second.resize(aspect, nx, nz);
    }

    pub fn geometry(&self) -> &Geometry {
        self.first.geometry()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.first.shape()
    }

    pub fn first(&self) -> &ScalarField {
        &self.first
    }

    pub fn second(&self) -> &ScalarField {
        &self.second
    }

    pub fn first_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.first.values_mut()
    }

    pub fn second_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.second.values_mut()
    }

    /// Both components as mutable views at once
    pub fn components_mut(&mut self) -> (ArrayViewMut2<'_, f64>, ArrayViewMut2<'_, f64>) {
        (self.first.values_mut(), self.second.values_mut())
    }

    /// Set both components to zero
    pub fn clear(&mut self) {
        self.first.fill(0.0);
        self.second.fill(0.0);
    }

    /// `∂first/∂x + ∂second/∂z` at every point
    pub fn divergence(&self, dest: &mut ScalarField) -> Result<()> {
        self.check_dest("divergence", dest)?;
        Zip::indexed(&mut dest.values_mut()).for_each(|(i, j), value| {
            *value = self.first.dx(i, j) + self.second.dz(i, j);
        });
        Ok(())
    }

    /// `sqrt(first² + second²)` at every point
    pub fn magnitude(&self, dest: &mut ScalarField) -> Result<()> {
        self.check_dest("magnitude", dest)?;
        Zip::from(&mut dest.values_mut())
            .and(self.first.values())
            .and(self.second.values())
            .for_each(|value, &a, &b| *value = a.hypot(b));
        Ok(())
    }

    fn check_dest(&self, operation: &'static str, dest: &ScalarField) -> Result<()> {
        if dest.shape() == self.shape() {
            Ok(())
        } else {
            Err(MultigridError::ResolutionMismatch {
                operation,
                expected: self.shape(),
                actual: dest.shape(),
            })
        }
    }
}
