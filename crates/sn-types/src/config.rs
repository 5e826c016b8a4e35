// ─────────────────────────────────────────────────────────────────────
// SCPN SN Transport — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{SnError, SnResult};

/// When the coarse-mesh accelerator runs relative to the iteration loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccelerationCadence {
    /// Full restrict/solve/prolong cycle once per outer iteration,
    /// after the inner loop has converged.
    #[default]
    PerOuter,
    /// Cycle after every inner sweep.
    PerInner,
}

/// When the scatter source is recomputed from the mesh flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScatterRefresh {
    /// After every sweep (Jacobi source iteration inside the inner loop).
    #[default]
    EverySweep,
    /// Only after the inner loop converges.
    EveryOuter,
}

/// Iteration settings for the eigenvalue controller.
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Tolerance on flux RMS, fission-source RMS and relative k change.
    #[serde(default = "default_eps")]
    pub eps: f64,
    /// Cap applied separately to inner and outer iteration counts.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Initial eigenvalue guess.
    #[serde(default = "default_initial_k")]
    pub initial_k: f64,
    /// Absolute floor on the relative-RMS denominator.
    #[serde(default = "default_norm_floor")]
    pub norm_floor: f64,
    #[serde(default)]
    pub acceleration: AccelerationCadence,
    #[serde(default)]
    pub scatter_refresh: ScatterRefresh,
    /// Sweep energy groups concurrently on the rayon pool.
    #[serde(default)]
    pub parallel_groups: bool,
    /// Edge labels: (west, east) or (west, east, north, south).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub boundary_conditions: Vec<String>,
}

fn default_eps() -> f64 {
    1e-6
}
fn default_max_iterations() -> usize {
    1000
}
fn default_initial_k() -> f64 {
    1.0
}
fn default_norm_floor() -> f64 {
    1e-12
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            eps: default_eps(),
            max_iterations: default_max_iterations(),
            initial_k: default_initial_k(),
            norm_floor: default_norm_floor(),
            acceleration: AccelerationCadence::default(),
            scatter_refresh: ScatterRefresh::default(),
            parallel_groups: false,
            boundary_conditions: Vec::new(),
        }
    }
}

impl SolverConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> SnResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json_str(json: &str) -> SnResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SnResult<()> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(SnError::ConfigError(format!(
                "eps must be finite and > 0, got {}",
                self.eps
            )));
        }
        if self.max_iterations == 0 {
            return Err(SnError::ConfigError(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        if !self.initial_k.is_finite() || self.initial_k <= 0.0 {
            return Err(SnError::ConfigError(format!(
                "initial_k must be finite and > 0, got {}",
                self.initial_k
            )));
        }
        if !self.norm_floor.is_finite() || self.norm_floor < 0.0 {
            return Err(SnError::ConfigError(format!(
                "norm_floor must be finite and >= 0, got {}",
                self.norm_floor
            )));
        }
        Ok(())
    }

    /// Boundary labels as string slices, ready for the resolver.
    pub fn boundary_labels(&self) -> Vec<&str> {
        self.boundary_conditions.iter().map(String::as_str).collect()
    }
}
