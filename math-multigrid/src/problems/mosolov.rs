//! Mosolov problem: Bingham fluid flow in a rectangular duct
//!
//! The viscoplastic problem is solved by an augmented Lagrangian iteration
//! around the linear Poisson solver. With `d = α∇u + λ`, the strain rate is
//! projected as `γ = (1 - B/|d|) d / α` where `|d| > B` and `γ = 0` in the
//! plug regions. The velocity is then re-solved with source
//! `(∇·(αγ - λ) - 1) / (1 + α)` and the multiplier updated by
//! `λ += α(∇u - γ)`, until `∇u` and `γ` agree.

use super::PoissonOperator;
use crate::error::{MultigridError, Result};
use crate::export::{FieldSnapshot, SnapshotContents};
use crate::field::{ScalarField, VectorField, rms};
use crate::multigrid::{CycleStatus, LinearMultigrid, MultigridCycle};
use crate::settings::Settings;
use log::{debug, info, warn};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

/// Bingham number above which the duct is fully plugged
pub fn critical_bingham(aspect: f64) -> f64 {
    (2.0 + aspect - (4.0 + aspect * aspect + (2.0 * PI - 4.0) * aspect).sqrt()) / (4.0 - PI)
}

/// Settings for [`MosolovFlow`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosolovSettings {
    /// Multigrid settings for the inner Poisson solves
    pub multigrid: Settings,
    /// Yield stress relative to the driving pressure gradient
    pub bingham_number: f64,
    /// Augmentation parameter `α`
    pub augmenting_parameter: f64,
    /// Maximum augmented Lagrangian iterations
    pub max_lagrange_iterations: usize,
    /// Convergence threshold on the normed strain-rate residual
    pub lagrange_tolerance: f64,
}

impl Default for MosolovSettings {
    fn default() -> Self {
        Self {
            multigrid: Settings {
                aspect_ratio: 2.0,
                ..Default::default()
            },
            bingham_number: 0.1,
            augmenting_parameter: 1.0,
            max_lagrange_iterations: 1000,
            lagrange_tolerance: 1e-6,
        }
    }
}

impl MosolovSettings {
    pub fn validate(&self) -> Result<()> {
        self.multigrid.validate()?;
        if !(self.bingham_number >= 0.0 && self.bingham_number.is_finite()) {
            return Err(MultigridError::InvalidSettings(format!(
                "Bingham number must be non-negative, got {}",
                self.bingham_number
            )));
        }
        if !(self.augmenting_parameter > 0.0 && self.augmenting_parameter.is_finite()) {
            return Err(MultigridError::InvalidSettings(format!(
                "augmenting parameter must be positive, got {}",
                self.augmenting_parameter
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file; missing keys take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings: MosolovSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Outcome of [`MosolovFlow::solve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagrangeReport {
    /// Augmented Lagrangian iterations performed
    pub iterations: usize,
    /// Final `rms(|∇u - γ|²) / rms(|∇u|²)`
    pub residual: f64,
    pub converged: bool,
    /// Integrated velocity, when the grid is fine enough for the quadrature
    pub flux: Option<f64>,
}

/// Augmented Lagrangian solver for Bingham flow in a duct
#[derive(Debug)]
pub struct MosolovFlow {
    solver: LinearMultigrid<PoissonOperator>,
    settings: MosolovSettings,
    multiplier: VectorField,
    strain_rate: VectorField,
    gradient: VectorField,
    flux_density: VectorField,
    scratch: ScalarField,
}

impl MosolovFlow {
    pub fn new(settings: MosolovSettings) -> Result<Self> {
        settings.validate()?;
        let solver = LinearMultigrid::new(PoissonOperator, settings.multigrid.clone())?;
        let aspect = settings.multigrid.aspect_ratio;
        let (nx, nz) = solver.result().shape();
        info!(
            "Mosolov problem ({}, {}) initialised at resolution ({}, {})",
            aspect, settings.bingham_number, nx, nz
        );

        Ok(Self {
            solver,
            settings,
            multiplier: VectorField::new(aspect, nx, nz),
            strain_rate: VectorField::new(aspect, nx, nz),
            gradient: VectorField::new(aspect, nx, nz),
            flux_density: VectorField::new(aspect, nx, nz),
            scratch: ScalarField::new(aspect, nx, nz),
        })
    }

    pub fn settings(&self) -> &MosolovSettings {
        &self.settings
    }

    pub fn solver(&self) -> &LinearMultigrid<PoissonOperator> {
        &self.solver
    }

    /// Velocity on the finest grid
    pub fn result(&self) -> &ScalarField {
        self.solver.result()
    }

    /// Current strain-rate estimate `γ`
    pub fn strain_rate(&self) -> &VectorField {
        &self.strain_rate
    }

    /// Current Lagrange multiplier `λ`
    pub fn multiplier(&self) -> &VectorField {
        &self.multiplier
    }

    /// Integrated velocity over the domain
    pub fn flux(&self) -> Result<f64> {
        self.solver.result().integral()
    }

    /// File name stem identifying the run, e.g. `A2.00000B0.10000`
    pub fn file_stem(&self) -> String {
        format!(
            "A{:.5}B{:.5}",
            self.settings.multigrid.aspect_ratio, self.settings.bingham_number
        )
    }

    /// Run the augmented Lagrangian iteration
    ///
    /// Each iteration performs one full multigrid pass for the velocity.
    /// Exhausting the iteration budget is reported, not an error.
    pub fn solve(&mut self) -> Result<LagrangeReport> {
        let alpha = self.settings.augmenting_parameter;
        let max_iterations = self.settings.max_lagrange_iterations;
        let tolerance = self.settings.lagrange_tolerance;

        self.multigrid_pass()?;
        let mut residual = f64::INFINITY;
        for iteration in 0..max_iterations {
            self.project_strain_rate()?;

            // ∇·(αγ - λ)
            {
                let (mut a, mut b) = self.flux_density.components_mut();
                Zip::from(&mut a)
                    .and(self.strain_rate.first().values())
                    .and(self.multiplier.first().values())
                    .for_each(|q, &g, &l| *q = alpha * g - l);
                Zip::from(&mut b)
                    .and(self.strain_rate.second().values())
                    .and(self.multiplier.second().values())
                    .for_each(|q, &g, &l| *q = alpha * g - l);
            }
            self.flux_density.divergence(&mut self.scratch)?;
            self.scratch
                .values_mut()
                .mapv_inplace(|div| (div - 1.0) / (1.0 + alpha));
            self.solver.set_source(&self.scratch)?;
            self.multigrid_pass()?;

            residual = self.normed_residual()?;
            debug!("Lagrange iteration {}: residual {:.3e}", iteration + 1, residual);
            if residual < tolerance {
                info!(
                    "Problem ({}, {}) converged after {} iterations, residual {:.3e}",
                    self.settings.multigrid.aspect_ratio,
                    self.settings.bingham_number,
                    iteration + 1,
                    residual
                );
                return Ok(LagrangeReport {
                    iterations: iteration + 1,
                    residual,
                    converged: true,
                    flux: self.flux().ok(),
                });
            }

            // λ += α(∇u - γ); the gradient is current from normed_residual
            let (mut l1, mut l2) = self.multiplier.components_mut();
            Zip::from(&mut l1)
                .and(self.gradient.first().values())
                .and(self.strain_rate.first().values())
                .for_each(|l, &du, &g| *l += alpha * (du - g));
            Zip::from(&mut l2)
                .and(self.gradient.second().values())
                .and(self.strain_rate.second().values())
                .for_each(|l, &du, &g| *l += alpha * (du - g));
        }

        warn!(
            "Problem ({}, {}) failed to converge after {} iterations, residual {:.3e}",
            self.settings.multigrid.aspect_ratio,
            self.settings.bingham_number,
            max_iterations,
            residual
        );
        Ok(LagrangeReport {
            iterations: max_iterations,
            residual,
            converged: false,
            flux: self.flux().ok(),
        })
    }

    fn multigrid_pass(&mut self) -> Result<()> {
        match self.solver.multigrid()? {
            CycleStatus::Completed => Ok(()),
            CycleStatus::SourceNotSet => Err(MultigridError::InvalidSettings(
                "Mosolov source term missing".to_string(),
            )),
        }
    }

    /// `γ = (1 - B/|d|) d / α` for `|d| > B`, else 0, with `d = α∇u + λ`
    fn project_strain_rate(&mut self) -> Result<()> {
        let alpha = self.settings.augmenting_parameter;
        let bingham = self.settings.bingham_number;
        self.solver.result().gradient(&mut self.gradient)?;

        let (mut g1, mut g2) = self.strain_rate.components_mut();
        Zip::from(&mut g1)
            .and(&mut g2)
            .and(self.gradient.first().values())
            .and(self.gradient.second().values())
            .and(self.multiplier.first().values())
            .and(self.multiplier.second().values())
            .for_each(|g1, g2, &du1, &du2, &l1, &l2| {
                let d1 = alpha * du1 + l1;
                let d2 = alpha * du2 + l2;
                let magnitude = d1.hypot(d2);
                if magnitude <= bingham {
                    *g1 = 0.0;
                    *g2 = 0.0;
                } else {
                    let scale = (1.0 - bingham / magnitude) / alpha;
                    *g1 = scale * d1;
                    *g2 = scale * d2;
                }
            });
        Ok(())
    }

    /// `rms(|∇u - γ|²) / rms(|∇u|²)`; leaves `∇u` in `self.gradient`
    fn normed_residual(&mut self) -> Result<f64> {
        self.solver.result().gradient(&mut self.gradient)?;
        let (nx, nz) = self.gradient.shape();

        let mut mismatch = Array2::zeros((nx, nz));
        Zip::from(&mut mismatch)
            .and(self.gradient.first().values())
            .and(self.gradient.second().values())
            .and(self.strain_rate.first().values())
            .and(self.strain_rate.second().values())
            .for_each(|m, &du1, &du2, &g1, &g2| {
                *m = (du1 - g1).powi(2) + (du2 - g2).powi(2);
            });

        let mut squared = Array2::zeros((nx, nz));
        Zip::from(&mut squared)
            .and(self.gradient.first().values())
            .and(self.gradient.second().values())
            .for_each(|s, &du1, &du2| *s = du1 * du1 + du2 * du2);

        let numerator = rms(mismatch.view());
        let denominator = rms(squared.view());
        Ok(if numerator == 0.0 {
            0.0
        } else {
            numerator / denominator
        })
    }

    /// Finest-level fields for export, tagged with the Bingham number
    pub fn snapshot(&self, contents: SnapshotContents) -> Result<FieldSnapshot> {
        Ok(FieldSnapshot::capture(self.solver.base(), contents)?
            .with_attribute("bingham_number", self.settings.bingham_number))
    }
}
