//! Scalar fields: values on a rectangular grid with stencil operators

use super::stencil::{Stencil, Weights, self_weight, shifted};
use super::{Geometry, VectorField};
use crate::boundary::{BoundaryConditions, BoundaryFlag, BoundaryPoint, ConditionType};
use crate::error::{MultigridError, Result};
use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip, s};
use std::ops::{Index, IndexMut};

/// Extended Simpson edge weights for the first (and mirrored last) four samples
const SIMPSON_EDGE_WEIGHTS: [f64; 4] = [17.0 / 48.0, 59.0 / 48.0, 43.0 / 48.0, 49.0 / 48.0];

/// Smallest resolution per axis accepted by [`ScalarField::integral`]
pub const MIN_INTEGRAL_POINTS: usize = 8;

/// All derivatives of a field at one grid point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Derivatives {
    pub dx: f64,
    pub dz: f64,
    pub dxx: f64,
    pub dzz: f64,
    pub dxz: f64,
}

/// A real-valued field on an `nx` x `nz` grid
///
/// `values()[[i, j]]` is the value at `(i·hx, j·hz)`. The field owns its
/// boundary conditions, whose edge lengths always track the resolution.
#[derive(Debug, Clone)]
pub struct ScalarField {
    data: Array2<f64>,
    geometry: Geometry,
    boundary_conditions: BoundaryConditions,
}

impl Default for ScalarField {
    fn default() -> Self {
        Self::new(1.0, 0, 0)
    }
}

impl ScalarField {
    /// Zero field over `[0, aspect] x [0, 1]`
    pub fn new(aspect: f64, nx: usize, nz: usize) -> Self {
        Self {
            data: Array2::zeros((nx, nz)),
            geometry: Geometry::new(aspect, nx, nz),
            boundary_conditions: BoundaryConditions::new(nx, nz),
        }
    }

    /// Field with the same geometry as `other`, all zeros, default boundaries
    pub fn zeros_like(other: &ScalarField) -> Self {
        Self::new(other.geometry.aspect, other.nx(), other.nz())
    }

    /// Change aspect ratio and resolution
    ///
    /// Values are reset to zero when the shape changes. Boundary edges are
    /// resized; an edge whose length is unchanged keeps its storage.
    pub fn resize(&mut self, aspect: f64, nx: usize, nz: usize) {
        if self.shape() != (nx, nz) {
            self.data = Array2::zeros((nx, nz));
        }
        self.geometry = Geometry::new(aspect, nx, nz);
        self.boundary_conditions.resize(nx, nz);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn nx(&self) -> usize {
        self.geometry.nx
    }

    pub fn nz(&self) -> usize {
        self.geometry.nz
    }

    /// `(nx, nz)`
    pub fn shape(&self) -> (usize, usize) {
        self.geometry.shape()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.data
    }

    /// Mutable view of the values; the shape cannot be changed through it
    pub fn values_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.data.view_mut()
    }

    pub fn boundary_conditions(&self) -> &BoundaryConditions {
        &self.boundary_conditions
    }

    pub fn boundary_conditions_mut(&mut self) -> &mut BoundaryConditions {
        &mut self.boundary_conditions
    }

    /// Set every value to `value`
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set every value from a function of the coordinates `(x, z)`
    pub fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut(f64, f64) -> f64,
    {
        let geometry = self.geometry;
        for ((i, j), value) in self.data.indexed_iter_mut() {
            *value = f(geometry.x(i), geometry.z(j));
        }
    }

    /// Copy values (not boundary conditions) from `other`
    pub fn assign(&mut self, other: &ScalarField) -> Result<()> {
        self.check_shape("assign", other)?;
        self.data.assign(&other.data);
        Ok(())
    }

    /// `self += other`, elementwise
    pub fn add_field(&mut self, other: &ScalarField) -> Result<()> {
        self.check_shape("add_field", other)?;
        self.data += &other.data;
        Ok(())
    }

    /// `self -= other`, elementwise
    pub fn sub_field(&mut self, other: &ScalarField) -> Result<()> {
        self.check_shape("sub_field", other)?;
        self.data -= &other.data;
        Ok(())
    }

    pub(crate) fn check_shape(&self, operation: &'static str, other: &ScalarField) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(MultigridError::ResolutionMismatch {
                operation,
                expected: self.shape(),
                actual: other.shape(),
            })
        }
    }

    /// x coordinates of the grid columns
    pub fn x_axis(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.nx(), |i| self.geometry.x(i))
    }

    /// z coordinates of the grid rows
    pub fn z_axis(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.nz(), |j| self.geometry.z(j))
    }

    // Derivatives

    fn along_x(&self, weights: Weights, i: usize, j: usize) -> f64 {
        weights
            .iter()
            .map(|&(o, w)| w * self.data[[shifted(i, o), j]])
            .sum()
    }

    fn along_z(&self, weights: Weights, i: usize, j: usize) -> f64 {
        weights
            .iter()
            .map(|&(o, w)| w * self.data[[i, shifted(j, o)]])
            .sum()
    }

    fn x_first(&self, i: usize) -> Weights {
        Stencil::at(i, self.nx()).first_derivative(self.nx())
    }

    fn z_first(&self, j: usize) -> Weights {
        Stencil::at(j, self.nz()).first_derivative(self.nz())
    }

    fn x_second(&self, i: usize) -> Weights {
        Stencil::at(i, self.nx()).second_derivative(self.nx())
    }

    fn z_second(&self, j: usize) -> Weights {
        Stencil::at(j, self.nz()).second_derivative(self.nz())
    }

    /// ∂u/∂x at `(i, j)`
    pub fn dx(&self, i: usize, j: usize) -> f64 {
        self.along_x(self.x_first(i), i, j) * self.geometry.xf
    }

    /// ∂u/∂z at `(i, j)`
    pub fn dz(&self, i: usize, j: usize) -> f64 {
        self.along_z(self.z_first(j), i, j) * self.geometry.zf
    }

    /// ∂²u/∂x² at `(i, j)`
    pub fn dxx(&self, i: usize, j: usize) -> f64 {
        self.along_x(self.x_second(i), i, j) * self.geometry.xxf
    }

    /// ∂²u/∂z² at `(i, j)`
    pub fn dzz(&self, i: usize, j: usize) -> f64 {
        self.along_z(self.z_second(j), i, j) * self.geometry.zzf
    }

    /// ∂²u/∂x∂z at `(i, j)`, the tensor product of the first-derivative stencils
    pub fn dxz(&self, i: usize, j: usize) -> f64 {
        let x_weights = self.x_first(i);
        let z_weights = self.z_first(j);
        let mut sum = 0.0;
        for &(ox, wx) in x_weights {
            for &(oz, wz) in z_weights {
                sum += wx * wz * self.data[[shifted(i, ox), shifted(j, oz)]];
            }
        }
        sum * self.geometry.xzf
    }

    /// Coefficient of `u(i, j)` in [`ScalarField::dx`]
    pub fn dxu(&self, i: usize) -> f64 {
        self_weight(self.x_first(i)) * self.geometry.xf
    }

    /// Coefficient of `u(i, j)` in [`ScalarField::dz`]
    pub fn dzu(&self, j: usize) -> f64 {
        self_weight(self.z_first(j)) * self.geometry.zf
    }

    /// Coefficient of `u(i, j)` in [`ScalarField::dxx`]
    pub fn dxxu(&self, i: usize) -> f64 {
        self_weight(self.x_second(i)) * self.geometry.xxf
    }

    /// Coefficient of `u(i, j)` in [`ScalarField::dzz`]
    pub fn dzzu(&self, j: usize) -> f64 {
        self_weight(self.z_second(j)) * self.geometry.zzf
    }

    /// Coefficient of `u(i, j)` in [`ScalarField::dxz`]
    pub fn dxzu(&self, i: usize, j: usize) -> f64 {
        self_weight(self.x_first(i)) * self_weight(self.z_first(j)) * self.geometry.xzf
    }

    /// Every derivative at `(i, j)`
    pub fn derivatives(&self, i: usize, j: usize) -> Derivatives {
        Derivatives {
            dx: self.dx(i, j),
            dz: self.dz(i, j),
            dxx: self.dxx(i, j),
            dzz: self.dzz(i, j),
            dxz: self.dxz(i, j),
        }
    }

    /// Enforce the boundary conditions on the edge values
    ///
    /// Dirichlet points take the prescribed value. Neumann points solve the
    /// one-sided 4th-order derivative formula for the edge value, given the
    /// derivative along +x (left/right) or +z (top/bottom); short axes fall
    /// back to lower-order formulas that may reach the opposite edge.
    ///
    /// Dirichlet values are written before any Neumann closure reads them and
    /// again afterwards, so a corner shared with a Dirichlet edge keeps the
    /// Dirichlet value and, unless both ends of a short axis are Neumann, a
    /// second call changes nothing. Corners between two Neumann edges come
    /// from the top/bottom closure.
    pub fn update_boundaries(&mut self) {
        apply_boundaries(&mut self.data, &self.geometry, &self.boundary_conditions);
    }

    /// Enforce another field's boundary conditions on the edge values
    ///
    /// # Panics
    /// If the edge lengths of `conditions` do not match this field.
    pub fn update_boundaries_with(&mut self, conditions: &BoundaryConditions) {
        apply_boundaries(&mut self.data, &self.geometry, conditions);
    }

    /// Write `(dx, dz)` at every point into `dest`
    pub fn gradient(&self, dest: &mut VectorField) -> Result<()> {
        if dest.shape() != self.shape() {
            return Err(MultigridError::ResolutionMismatch {
                operation: "gradient",
                expected: self.shape(),
                actual: dest.shape(),
            });
        }
        let (mut first, mut second) = dest.components_mut();
        Zip::indexed(&mut first)
            .and(&mut second)
            .for_each(|(i, j), gx, gz| {
                *gx = self.dx(i, j);
                *gz = self.dz(i, j);
            });
        Ok(())
    }

    /// Write `|∇u|` at every point into `dest`
    pub fn gradient_magnitude(&self, dest: &mut ScalarField) -> Result<()> {
        self.check_shape("gradient_magnitude", dest)?;
        Zip::indexed(&mut dest.data).for_each(|(i, j), value| {
            *value = self.dx(i, j).hypot(self.dz(i, j));
        });
        Ok(())
    }

    /// Integral over the domain by separable extended Simpson quadrature
    ///
    /// Needs at least [`MIN_INTEGRAL_POINTS`] points along each axis.
    pub fn integral(&self) -> Result<f64> {
        let (nx, nz) = self.shape();
        if nx < MIN_INTEGRAL_POINTS || nz < MIN_INTEGRAL_POINTS {
            return Err(MultigridError::ResolutionTooSmall {
                operation: "integral",
                nx,
                nz,
                minimum: MIN_INTEGRAL_POINTS,
            });
        }

        let wx = simpson_weights(nx);
        let wz = simpson_weights(nz);
        let rows = self.data.dot(&wz) * self.geometry.hz;
        Ok(rows.dot(&wx) * self.geometry.hx)
    }

    /// Root-mean-square value over all points
    pub fn norm(&self) -> f64 {
        rms(self.data.view())
    }
}

impl Index<(usize, usize)> for ScalarField {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[[i, j]]
    }
}

impl IndexMut<(usize, usize)> for ScalarField {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[[i, j]]
    }
}

/// Root-mean-square of an array, zero when empty
pub fn rms(values: ArrayView2<'_, f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

fn simpson_weights(n: usize) -> Array1<f64> {
    let mut weights = Array1::ones(n);
    for (k, &w) in SIMPSON_EDGE_WEIGHTS.iter().enumerate() {
        weights[k] = w;
        weights[n - 1 - k] = w;
    }
    weights
}

fn apply_boundaries(data: &mut Array2<f64>, geometry: &Geometry, conditions: &BoundaryConditions) {
    for pass in [
        ConditionType::Dirichlet,
        ConditionType::Neumann,
        ConditionType::Dirichlet,
    ] {
        apply_boundary_pass(data, geometry, conditions, pass);
    }
}

/// Enforce the points of one condition type, edges in left, right, top, bottom order
fn apply_boundary_pass(
    data: &mut Array2<f64>,
    geometry: &Geometry,
    conditions: &BoundaryConditions,
    condition_type: ConditionType,
) {
    let Geometry { hx, hz, .. } = *geometry;
    for flag in BoundaryFlag::ALL {
        conditions.edge(flag).for_each(|k, point| {
            if point.condition_type != condition_type {
                return;
            }
            let (lane, h, sign) = match flag {
                BoundaryFlag::Left => (data.slice_mut(s![.., k]), hx, -1.0),
                BoundaryFlag::Right => (data.slice_mut(s![..;-1, k]), hx, 1.0),
                BoundaryFlag::Top => (data.slice_mut(s![k, ..]), hz, -1.0),
                BoundaryFlag::Bottom => (data.slice_mut(s![k, ..;-1]), hz, 1.0),
            };
            enforce(lane, point, sign * h);
        });
    }
}

/// Apply one boundary point to a lane whose element 0 is on the edge
///
/// `signed_h` is `-h` on low-index edges and `+h` on high-index edges.
fn enforce(mut lane: ArrayViewMut1<'_, f64>, point: BoundaryPoint, signed_h: f64) {
    match point.condition_type {
        ConditionType::Dirichlet => lane[0] = point.value,
        ConditionType::Neumann => {
            let g = signed_h * point.value;
            let value = match lane.len() {
                0 | 1 => return,
                2 => lane[1] + g,
                3 => (4.0 * lane[1] - lane[2] + 2.0 * g) / 3.0,
                4 => (18.0 * lane[1] - 9.0 * lane[2] + 2.0 * lane[3] + 6.0 * g) / 11.0,
                _ => {
                    (48.0 * lane[1] - 36.0 * lane[2] + 16.0 * lane[3] - 3.0 * lane[4] + 12.0 * g)
                        / 25.0
                }
            };
            lane[0] = value;
        }
    }
}
