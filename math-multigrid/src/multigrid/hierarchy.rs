//! Grid hierarchy for geometric multigrid
//!
//! Manages a sequence of grids from coarse (level 0) to fine, each level
//! doubling the resolution of the one below.

use super::transfer::{prolong, refined_resolution, restrict};
use crate::boundary::BoundaryConditions;
use crate::error::Result;
use crate::field::ScalarField;
use crate::settings::Settings;
use log::debug;
use std::ops::{Index, IndexMut};

/// Coarsest-level resolution `(nx, nz)` for an aspect ratio
///
/// The short side of the domain gets `minimum_resolution` points and the
/// long side is scaled so the spacings roughly agree (`h ≈ 2/(n-1)`).
pub fn coarsest_resolution(aspect: f64, minimum_resolution: usize) -> (usize, usize) {
    let m = minimum_resolution.saturating_sub(1) as f64;
    if aspect < 2.0 {
        let nz = (2.0 * m / aspect).round() as usize + 1;
        (minimum_resolution, nz)
    } else {
        let nx = (aspect * m / 2.0 + 1.0).round() as usize;
        (nx, minimum_resolution)
    }
}

/// Stack of fields at geometrically doubling resolutions
///
/// The hierarchy owns one canonical set of boundary conditions sized for the
/// finest level. Every level's boundary conditions are strided views into it
/// (stride `2^(finest - level)`), so editing the canonical set through
/// [`GridHierarchy::boundary_conditions_mut`] updates all levels at once.
/// Replacing the set wholesale breaks that link until
/// [`GridHierarchy::relink_boundary_conditions`] is called.
#[derive(Debug)]
pub struct GridHierarchy {
    levels: Vec<ScalarField>,
    boundary_conditions: BoundaryConditions,
}

impl GridHierarchy {
    /// Zero-initialised hierarchy with default boundary conditions
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let aspect = settings.aspect_ratio;
        let (mut nx, mut nz) = coarsest_resolution(aspect, settings.minimum_resolution);

        let mut levels = Vec::with_capacity(settings.number_of_grids);
        for level in 0..settings.number_of_grids {
            if level > 0 {
                nx = refined_resolution(nx);
                nz = refined_resolution(nz);
            }
            levels.push(ScalarField::new(aspect, nx, nz));
        }
        debug!(
            "Grid hierarchy: {} levels, coarsest {:?}, finest ({}, {})",
            levels.len(),
            levels[0].shape(),
            nx,
            nz
        );

        let mut hierarchy = Self {
            levels,
            boundary_conditions: BoundaryConditions::with_default_conditions(nx, nz),
        };
        hierarchy.relink_boundary_conditions()?;
        Ok(hierarchy)
    }

    /// Re-alias every level's boundary conditions to the canonical set
    pub fn relink_boundary_conditions(&mut self) -> Result<()> {
        let finest = self.finest_level();
        for (level, field) in self.levels.iter_mut().enumerate() {
            let stride = 1usize << (finest - level);
            field
                .boundary_conditions_mut()
                .alias_all(&self.boundary_conditions, stride)?;
        }
        Ok(())
    }

    /// Canonical (finest-level) boundary conditions
    pub fn boundary_conditions(&self) -> &BoundaryConditions {
        &self.boundary_conditions
    }

    /// Mutable canonical boundary conditions; edits are seen by every level
    pub fn boundary_conditions_mut(&mut self) -> &mut BoundaryConditions {
        &mut self.boundary_conditions
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn coarsest_level(&self) -> usize {
        0
    }

    pub fn finest_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn finest(&self) -> &ScalarField {
        &self.levels[self.finest_level()]
    }

    pub fn finest_mut(&mut self) -> &mut ScalarField {
        let finest = self.finest_level();
        &mut self.levels[finest]
    }

    pub fn levels(&self) -> &[ScalarField] {
        &self.levels
    }

    /// Restrict `level` into `level - 1`
    ///
    /// # Panics
    /// If `level` is 0 or past the finest level.
    pub fn coarsen(&mut self, level: usize) -> Result<()> {
        let (coarse, fine) = self.levels.split_at_mut(level);
        restrict(&mut coarse[level - 1], &fine[0])
    }

    /// Restrict `level` into `dest`, which must have the resolution of `level - 1`
    pub fn coarsen_into(&self, level: usize, dest: &mut ScalarField) -> Result<()> {
        restrict(dest, &self.levels[level])
    }

    /// Prolong `level` into `level + 1`
    ///
    /// # Panics
    /// If `level` is the finest level or beyond.
    pub fn refine(&mut self, level: usize) -> Result<()> {
        let (coarse, fine) = self.levels.split_at_mut(level + 1);
        prolong(&coarse[level], &mut fine[0])
    }

    /// Prolong `level` into `dest`, which must have the resolution of `level + 1`
    pub fn refine_into(&self, level: usize, dest: &mut ScalarField) -> Result<()> {
        prolong(&self.levels[level], dest)
    }
}

impl Index<usize> for GridHierarchy {
    type Output = ScalarField;

    fn index(&self, level: usize) -> &ScalarField {
        &self.levels[level]
    }
}

impl IndexMut<usize> for GridHierarchy {
    fn index_mut(&mut self, level: usize) -> &mut ScalarField {
        &mut self.levels[level]
    }
}
