//! JSON export of finest-level solver output

use crate::error::{MultigridError, Result};
use crate::field::ScalarField;
use crate::multigrid::{MultigridBase, Problem};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Which optional fields a snapshot carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotContents {
    /// Solution only
    #[default]
    Solution,
    /// Solution and gradient magnitude
    WithGradient,
    /// Solution, gradient magnitude and log residual
    WithResidual,
}

impl SnapshotContents {
    /// Contents from a variable count: 1 solution, 2 adds the gradient, 3 the residual
    pub fn from_count(count: usize) -> Result<Self> {
        match count {
            1 => Ok(SnapshotContents::Solution),
            2 => Ok(SnapshotContents::WithGradient),
            3 => Ok(SnapshotContents::WithResidual),
            n => Err(MultigridError::InvalidSettings(format!(
                "variable count must be 1, 2 or 3, got {n}"
            ))),
        }
    }

    fn gradient(self) -> bool {
        self != SnapshotContents::Solution
    }

    fn residual(self) -> bool {
        self == SnapshotContents::WithResidual
    }
}

/// Finest-level fields with their axes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// Column coordinates `i * hx`
    pub x: Array1<f64>,
    /// Row coordinates `j * hz`
    pub z: Array1<f64>,
    /// Solution values indexed `[i, j]`
    pub solution: Array2<f64>,
    /// `|∇u|`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_magnitude: Option<Array2<f64>>,
    /// `log10(|f - L u|)`, zero residuals floored at the smallest positive double
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_residual: Option<Array2<f64>>,
    pub aspect_ratio: f64,
    /// Integral of the solution, absent on grids too coarse for the quadrature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_flux: Option<f64>,
    /// Problem parameters, e.g. the Bingham number
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
}

impl FieldSnapshot {
    /// Capture the finest level of `base`
    pub fn capture<P: Problem>(base: &MultigridBase<P>, contents: SnapshotContents) -> Result<Self> {
        let solution = base.result();
        let finest = base.finest_level();

        let gradient_magnitude = if contents.gradient() {
            let mut magnitude = ScalarField::zeros_like(solution);
            solution.gradient_magnitude(&mut magnitude)?;
            Some(magnitude.values().clone())
        } else {
            None
        };

        let log_residual = if contents.residual() {
            let mut residual = ScalarField::zeros_like(solution);
            base.evaluate_residual(finest, &mut residual)?;
            Some(residual.values().mapv(log_magnitude))
        } else {
            None
        };

        Ok(Self {
            x: solution.x_axis(),
            z: solution.z_axis(),
            solution: solution.values().clone(),
            gradient_magnitude,
            log_residual,
            aspect_ratio: solution.geometry().aspect,
            total_flux: solution.integral().ok(),
            attributes: BTreeMap::new(),
        })
    }

    /// Add a named scalar attribute
    pub fn with_attribute(mut self, name: &str, value: f64) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Write as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot written by [`FieldSnapshot::write_json`]
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

fn log_magnitude(value: f64) -> f64 {
    value.abs().max(f64::MIN_POSITIVE).log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::PoissonOperator;
    use crate::settings::Settings;

    fn engine() -> MultigridBase<PoissonOperator> {
        let settings = Settings {
            number_of_grids: 3,
            ..Default::default()
        };
        MultigridBase::new(PoissonOperator, settings).unwrap()
    }

    #[test]
    fn test_contents_from_count() {
        assert_eq!(SnapshotContents::from_count(1).unwrap(), SnapshotContents::Solution);
        assert_eq!(SnapshotContents::from_count(3).unwrap(), SnapshotContents::WithResidual);
        assert!(SnapshotContents::from_count(4).is_err());
    }

    #[test]
    fn test_capture_selects_fields() {
        let engine = engine();
        let snapshot = FieldSnapshot::capture(&engine, SnapshotContents::Solution).unwrap();
        assert!(snapshot.gradient_magnitude.is_none());
        assert!(snapshot.log_residual.is_none());
        assert_eq!(snapshot.x.len(), engine.result().nx());
        assert_eq!(snapshot.solution.dim(), engine.result().shape());

        let snapshot = FieldSnapshot::capture(&engine, SnapshotContents::WithResidual).unwrap();
        let log_residual = snapshot.log_residual.unwrap();
        // Boundary residual is zero and gets floored
        assert_eq!(log_residual[[0, 0]], f64::MIN_POSITIVE.log10());
        // Interior residual of the zero guess is |-1|
        assert_eq!(log_residual[[2, 2]], 0.0);
        assert!(snapshot.gradient_magnitude.is_some());
        assert!(snapshot.total_flux.is_some());
    }

    #[test]
    fn test_json_round_trip() {
        let engine = engine();
        let snapshot = FieldSnapshot::capture(&engine, SnapshotContents::WithGradient)
            .unwrap()
            .with_attribute("bingham_number", 0.25);
        let path = std::env::temp_dir().join(format!(
            "math_multigrid_snapshot_{}.json",
            std::process::id()
        ));
        snapshot.write_json(&path).unwrap();
        let loaded = FieldSnapshot::read_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.solution, snapshot.solution);
        assert_eq!(loaded.attributes["bingham_number"], 0.25);
        assert!(loaded.log_residual.is_none());
    }
}
