//! JSON configuration for multigrid solvers

use crate::error::{MultigridError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Number of recursive correction cycles per FMG level
///
/// `1` is a V-cycle, `2` a W-cycle; larger values are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleType(pub usize);

impl CycleType {
    pub const V: CycleType = CycleType(1);
    pub const W: CycleType = CycleType(2);

    /// Cycles per level
    pub fn count(self) -> usize {
        self.0
    }
}

impl Default for CycleType {
    fn default() -> Self {
        CycleType::W
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => f.write_str("V"),
            2 => f.write_str("W"),
            n => write!(f, "{n}-cycle"),
        }
    }
}

/// Multigrid solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of the domain; the height is always 1
    pub aspect_ratio: f64,
    /// Number of grid levels
    pub number_of_grids: usize,
    /// Points on the short side of the coarsest grid
    pub minimum_resolution: usize,
    /// Relative change for coarsest-level solves and absolute RMS residual
    /// for [`solve`](crate::multigrid::MultigridCycle::solve)
    pub residual_tolerance: f64,
    /// Sweep budget for tolerance relaxation and cycle budget for `solve`
    pub maximum_iterations: usize,
    /// V, W or general cycle
    pub cycle_type: CycleType,
    /// Relaxation sweeps before restriction
    pub pre_relax_count: usize,
    /// Relaxation sweeps after prolongation
    pub post_relax_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            number_of_grids: 8,
            minimum_resolution: 4,
            residual_tolerance: 1e-10,
            maximum_iterations: 400,
            cycle_type: CycleType::W,
            pre_relax_count: 1,
            post_relax_count: 2,
        }
    }
}

impl Settings {
    /// Check the settings describe a usable hierarchy
    pub fn validate(&self) -> Result<()> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(MultigridError::InvalidSettings(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.number_of_grids == 0 {
            return Err(MultigridError::InvalidSettings(
                "at least one grid level is required".to_string(),
            ));
        }
        if self.minimum_resolution < 4 {
            return Err(MultigridError::InvalidSettings(format!(
                "minimum resolution must be at least 4, got {}",
                self.minimum_resolution
            )));
        }
        if self.cycle_type.count() == 0 {
            return Err(MultigridError::InvalidSettings(
                "cycle type must be at least 1".to_string(),
            ));
        }
        if !(self.residual_tolerance > 0.0) {
            return Err(MultigridError::InvalidSettings(format!(
                "residual tolerance must be positive, got {}",
                self.residual_tolerance
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file; missing keys take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
