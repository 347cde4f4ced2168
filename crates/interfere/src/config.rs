//! Run configuration.
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! attr_name = "_name"
//! oml = true
//! tess_params = [0.025, 0.001, 15.0]
//! workers = 8
//! ```

use std::path::Path;

use interfere_cloud::NearestSolver;
use interfere_kernel::TessParams;
use serde::{Deserialize, Serialize};

use crate::{InterferenceError, Result};

/// Configuration for an interference run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterferenceConfig {
    /// Body attribute holding each body's name. Bodies without a string
    /// value under this key are ignored.
    pub attr_name: String,

    /// Treat the named body with the largest bounding box as the outer
    /// container.
    pub oml: bool,

    /// Tessellation `[max edge length, chord deviation, angle in degrees]`.
    /// The first two are fractions of the largest bounding-box extent.
    pub tess_params: [f64; 3],

    /// Nearest-neighbour worker threads (default: available parallelism).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for InterferenceConfig {
    fn default() -> Self {
        Self {
            attr_name: "_name".into(),
            oml: true,
            tess_params: [0.025, 0.001, 15.0],
            workers: None,
        }
    }
}

impl InterferenceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| InterferenceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| InterferenceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check that the values can drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.attr_name.is_empty() {
            return Err(InterferenceError::Config("attr_name is empty".into()));
        }
        if let Some(bad) = self.tess_params.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
            return Err(InterferenceError::Config(format!(
                "tess_params must be positive, got {bad}"
            )));
        }
        if self.workers == Some(0) {
            return Err(InterferenceError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }

    /// Tessellation parameters for a scene whose largest extent is `size`.
    pub fn tess_params(&self, size: f64) -> TessParams {
        let [len, chord, angle] = self.tess_params;
        TessParams::from_array([len * size, chord * size, angle])
    }

    /// Nearest-neighbour solver for the configured worker count.
    pub fn solver(&self) -> NearestSolver {
        self.workers.map_or_else(NearestSolver::available, NearestSolver::new)
    }
}
