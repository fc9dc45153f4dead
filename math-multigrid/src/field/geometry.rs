//! Grid geometry and cached finite-difference factors

use serde::{Deserialize, Serialize};

/// Geometry of an `nx` x `nz` grid over `[0, aspect] x [0, 1]`
///
/// The derivative factors are derived once from the spacing so stencil
/// evaluation is a plain weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Width of the domain (its height is 1)
    pub aspect: f64,
    /// Points along x
    pub nx: usize,
    /// Points along z
    pub nz: usize,
    /// Spacing along x: `aspect / (nx - 1)`
    pub hx: f64,
    /// Spacing along z: `1 / (nz - 1)`
    pub hz: f64,
    /// `1 / (2 hx)`
    pub xf: f64,
    /// `1 / (2 hz)`
    pub zf: f64,
    /// `1 / hx²`
    pub xxf: f64,
    /// `1 / hz²`
    pub zzf: f64,
    /// `1 / (4 hx hz)`
    pub xzf: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(1.0, 0, 0)
    }
}

impl Geometry {
    /// Geometry for the given aspect ratio and resolution
    ///
    /// Axes with fewer than two points get zero spacing and zero factors.
    pub fn new(aspect: f64, nx: usize, nz: usize) -> Self {
        let hx = spacing(aspect, nx);
        let hz = spacing(1.0, nz);
        let (xf, xxf) = factors(hx);
        let (zf, zzf) = factors(hz);

        Self {
            aspect,
            nx,
            nz,
            hx,
            hz,
            xf,
            zf,
            xxf,
            zzf,
            xzf: xf * zf,
        }
    }

    /// `(nx, nz)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.nz)
    }

    /// Coordinate of grid index `i` along x
    pub fn x(&self, i: usize) -> f64 {
        i as f64 * self.hx
    }

    /// Coordinate of grid index `j` along z
    pub fn z(&self, j: usize) -> f64 {
        j as f64 * self.hz
    }
}

fn spacing(extent: f64, n: usize) -> f64 {
    if n > 1 { extent / (n - 1) as f64 } else { 0.0 }
}

fn factors(h: f64) -> (f64, f64) {
    if h > 0.0 {
        (1.0 / (2.0 * h), 1.0 / (h * h))
    } else {
        (0.0, 0.0)
    }
}
