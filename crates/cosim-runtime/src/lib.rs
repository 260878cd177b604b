//! Lifecycle runtime for co-simulation components.
//!
//! Wraps a [`Model`] in a [`ComponentInstance`] that enforces the calling
//! sequence a host must follow, validates every read and write against the
//! variable registry, and routes diagnostic messages to a pluggable sink.
//!
//! ## Modules
//!
//! - [`model`] — The model contract, instance data and model metadata
//! - [`instance`] — Component instance and lifecycle phases
//! - [`accessor`] — Typed by-name variable accessors
//! - [`logging`] — Status codes, log sinks and the per-instance logger
//! - [`config`] — TOML simulation configuration
//! - [`error`] — Runtime errors

pub mod accessor;
pub mod config;
pub mod error;
pub mod instance;
pub mod logging;
pub mod model;

// Re-export key types for convenience
pub use accessor::{Accessor, BoolVariable, IntVariable, RealVariable, StringVariable};
pub use config::{ExperimentConfig, LoggingConfig, SimulationConfig};
pub use error::{ComponentError, Result};
pub use instance::{ComponentInstance, Experiment, Phase};
pub use logging::{LogSink, Logger, Status, TracingSink};
pub use model::{DefaultExperiment, InstanceData, Model, ModelInfo, StepContext};

pub use cosim_core::{
    field, Causality, Initial, RegistryError, ValueReference, Variability, VariableRegistry,
    VariableSpec, VariableType,
};
