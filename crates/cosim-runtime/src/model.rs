//! The contract a simulation model implements.
//!
//! A model owns the storage of its variables, registers them once at
//! instantiation, and supplies a stepping and a reset function. It never
//! talks to the host directly: every host call goes through the
//! [`ComponentInstance`](crate::instance::ComponentInstance) that wraps it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use cosim_core::{RegistryError, VariableRegistry};

use crate::logging::{Logger, Status};

/// Host-provided data available to a model at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceData {
    /// Name the host gave this instance.
    pub instance_name: String,
    /// Directory holding the component's bundled resources.
    pub resource_path: PathBuf,
}

impl InstanceData {
    pub fn new(instance_name: impl Into<String>, resource_path: impl Into<PathBuf>) -> Self {
        Self {
            instance_name: instance_name.into(),
            resource_path: resource_path.into(),
        }
    }
}

/// Default experiment advertised by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultExperiment {
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub stop_time: Option<f64>,
    #[serde(default)]
    pub step_size: Option<f64>,
    #[serde(default)]
    pub tolerance: Option<f64>,
}

/// Descriptive metadata about a model, consumed by packaging tooling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModelInfo {
    /// Identifier used for the packaged component (required).
    pub model_identifier: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub default_experiment: Option<DefaultExperiment>,
}

impl ModelInfo {
    pub fn new(model_identifier: impl Into<String>) -> Self {
        Self {
            model_identifier: model_identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The human-readable name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(&self.model_identifier)
    }
}

/// Everything a model sees while taking one step.
pub struct StepContext<'a> {
    current_time: f64,
    step_size: f64,
    logger: &'a Logger,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(current_time: f64, step_size: f64, logger: &'a Logger) -> Self {
        Self {
            current_time,
            step_size,
            logger,
        }
    }

    /// Time at the start of the step.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Communication step size.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Name of the instance taking the step.
    pub fn instance_name(&self) -> &str {
        self.logger.instance_name()
    }

    /// Write a message to the instance's log sink.
    pub fn log(&self, status: Status, message: &str) {
        self.logger.log(status, message);
    }

    /// Write a message under a named category.
    pub fn log_category(&self, status: Status, category: &str, message: &str) {
        self.logger.log_category(status, category, message);
    }
}

/// A simulation model driven by a component instance.
pub trait Model: Sized {
    /// Construct the model's storage.
    fn instantiate(data: &InstanceData) -> Self;

    /// Register every variable. Called once, right after `instantiate`.
    fn register_variables(registry: &mut VariableRegistry<Self>) -> Result<(), RegistryError>;

    /// Advance the model by one communication step.
    ///
    /// Returning `false` signals that the step could not be completed; the
    /// host decides how to recover.
    fn do_step(&mut self, ctx: &StepContext<'_>) -> bool;

    /// Restore every variable to its starting value.
    fn reset(&mut self);

    /// Metadata describing this model.
    fn model_info() -> ModelInfo;

    fn setup_experiment(&mut self, _start: f64, _stop: Option<f64>, _tolerance: Option<f64>) {}

    fn enter_initialisation_mode(&mut self) {}

    fn exit_initialisation_mode(&mut self) {}

    fn terminate(&mut self) {}
}
