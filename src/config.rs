//! Tunable parameters for filtration construction and cloud sampling.
//!
//! [`FiltrationConfig`] carries the recognised options of the pipeline
//! (`precision`, `margin`, `pruning`, `bandwidth`). It is serializable so a run
//! can be described by a JSON file and reproduced later.
//!
//! ```rust
//! use tda_cubical::FiltrationConfig;
//!
//! let cfg = FiltrationConfig::default();
//! cfg.validate().expect("default config is valid");
//! assert_eq!(cfg.precision, 10);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cloud::Shape;
use crate::density::Bandwidth;
use crate::error::{TdaError, TdaResult};

/// Parameters of the grid, the filtration and the density estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltrationConfig {
    /// Lattice points per axis. Default: **10**.
    pub precision: usize,

    /// Fraction of each axis range added on both ends of the bounding box.
    /// Default: **0.1**.
    pub margin: f64,

    /// Drop every cube whose value is not strictly below this threshold.
    /// Must lie in `(0, 1]`. Default: **none**.
    pub pruning: Option<f64>,

    /// Forwarded to the density estimator. Default: **Scott**.
    pub bandwidth: Bandwidth,
}

impl Default for FiltrationConfig {
    fn default() -> Self {
        Self {
            precision: 10,
            margin: 0.1,
            pruning: None,
            bandwidth: Bandwidth::Scott,
        }
    }
}

impl FiltrationConfig {
    /// Check every field against its documented range.
    pub fn validate(&self) -> TdaResult<()> {
        if self.precision == 0 {
            return Err(TdaError::InvalidGrid("precision must be positive".into()));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(TdaError::InvalidGrid(format!(
                "margin must be a nonnegative finite fraction, got {}",
                self.margin
            )));
        }
        if let Some(p) = self.pruning {
            validate_pruning(p)?;
        }
        self.bandwidth.validate()
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json(path: &Path) -> TdaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&contents)?;
        Ok(cfg)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn to_json(&self, path: &Path) -> TdaResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

pub(crate) fn validate_pruning(threshold: f64) -> TdaResult<()> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(TdaError::InvalidConfig(format!(
            "pruning threshold must lie in (0, 1], got {threshold}"
        )));
    }
    Ok(())
}

/// How to draw a synthetic point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub shape: Shape,
    /// Number of points. Default: **1000**.
    pub points: usize,
    /// Standard deviation of the Gaussian perturbation. Default: **0.1**.
    pub noise: f64,
    /// Seed of the ChaCha generator. Default: **42**.
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            shape: Shape::circle(),
            points: 1000,
            noise: 0.1,
            seed: 42,
        }
    }
}

impl SampleConfig {
    pub fn validate(&self) -> TdaResult<()> {
        if self.points == 0 {
            return Err(TdaError::InvalidConfig("points must be positive".into()));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(TdaError::InvalidConfig(format!(
                "noise must be a nonnegative finite deviation, got {}",
                self.noise
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FiltrationConfig::default().validate().is_ok());
        assert!(SampleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let cfg = FiltrationConfig { precision: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(TdaError::InvalidGrid(_))));

        let cfg = FiltrationConfig { margin: -0.1, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(TdaError::InvalidGrid(_))));

        for p in [0.0, -0.5, 1.5, f64::NAN] {
            let cfg = FiltrationConfig { pruning: Some(p), ..Default::default() };
            assert!(matches!(cfg.validate(), Err(TdaError::InvalidConfig(_))), "pruning {p}");
        }

        let cfg = FiltrationConfig { pruning: Some(1.0), ..Default::default() };
        assert!(cfg.validate().is_ok());

        let cfg = SampleConfig { noise: -1.0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(TdaError::InvalidConfig(_))));
    }

    #[test]
    fn test_json_roundtrip_with_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "precision": 20, "pruning": 0.8 }"#).unwrap();

        let cfg = FiltrationConfig::from_json(&path).unwrap();
        assert_eq!(cfg.precision, 20);
        assert_eq!(cfg.pruning, Some(0.8));
        assert_eq!(cfg.margin, 0.1);
        assert_eq!(cfg.bandwidth, Bandwidth::Scott);

        let out = dir.path().join("full.json");
        cfg.to_json(&out).unwrap();
        assert_eq!(FiltrationConfig::from_json(&out).unwrap(), cfg);
    }
}
