//! Simulation configuration files.
//!
//! A configuration document describes the experiment a host intends to run
//! and how verbose the component should be:
//!
//! ```toml
//! [experiment]
//! start-time = 0.0
//! stop-time = 10.0
//! step-size = 0.1
//!
//! [logging]
//! debug = true
//! categories = ["step"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, Result};

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Time span, step size and tolerance of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExperimentConfig {
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub stop_time: Option<f64>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

fn default_step_size() -> f64 {
    0.1
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: None,
            tolerance: None,
            step_size: default_step_size(),
        }
    }
}

impl ExperimentConfig {
    /// Check the experiment for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !self.start_time.is_finite() {
            return Err(invalid("experiment.start-time must be finite"));
        }
        if let Some(stop) = self.stop_time {
            if stop.is_nan() || stop < self.start_time {
                return Err(invalid(format!(
                    "experiment.stop-time ({stop}) is before start-time ({})",
                    self.start_time
                )));
            }
        }
        if let Some(tol) = self.tolerance {
            if tol.is_nan() || tol <= 0.0 {
                return Err(invalid("experiment.tolerance must be positive"));
            }
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(invalid("experiment.step-size must be positive"));
        }
        Ok(())
    }

    /// Number of whole steps needed to cover the experiment, if it has a
    /// stop time.
    pub fn step_count(&self) -> Option<u64> {
        self.stop_time.map(|stop| {
            let span = (stop - self.start_time) / self.step_size;
            // Absorb float noise so 10.0 / 0.1 counts as 100 steps.
            (span - 1e-9).ceil().max(0.0) as u64
        })
    }
}

/// Debug-logging switches applied to the instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub categories: Vec<String>,
}

fn invalid(detail: impl Into<String>) -> ComponentError {
    ComponentError::InvalidConfig {
        detail: detail.into(),
    }
}

impl SimulationConfig {
    /// Parse a configuration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(input)?;
        config.experiment.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}
