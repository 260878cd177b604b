//! The component instance and its lifecycle state machine.
//!
//! A [`ComponentInstance`] owns a model, the registry describing the model's
//! variables, and the current lifecycle [`Phase`]. Every host call is
//! validated against the phase before it reaches the registry or the model:
//!
//! ```text
//! Instantiated --setup_experiment--> Configuration
//!     --enter_initialisation_mode--> Initialisation
//!     --exit_initialisation_mode--> StepMode --terminate--> Terminated
//! ```
//!
//! `reset` rewinds the model's data without changing the phase. A rejected
//! call returns [`ComponentError::InvalidCall`] and leaves the phase, the
//! time and every variable untouched.
//!
//! All entry points take `&mut self`, so an instance can never be entered
//! concurrently. Instances share no state with each other.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use cosim_core::{ScalarValue, ValueReference, VariableRegistry};

use crate::accessor::{Accessor, BoolVariable, IntVariable, RealVariable, StringVariable};
use crate::config::{ExperimentConfig, LoggingConfig};
use crate::error::{ComponentError, Result};
use crate::logging::{LogSink, Logger, TracingSink};
use crate::model::{InstanceData, Model, ModelInfo, StepContext};

/// Lifecycle phase of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, variables registered, experiment not yet set up.
    Instantiated,
    /// Experiment set up; initialisation not yet entered.
    Configuration,
    /// Inside initialisation mode.
    Initialisation,
    /// Initialisation closed; the host may step.
    StepMode,
    /// Terminal. Every call fails.
    Terminated,
}

impl Phase {
    /// Whether the host may write non-output variables in this phase.
    pub fn accepts_writes(&self) -> bool {
        matches!(
            self,
            Self::Instantiated | Self::Configuration | Self::Initialisation
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instantiated => write!(f, "instantiated"),
            Self::Configuration => write!(f, "configuration"),
            Self::Initialisation => write!(f, "initialisation"),
            Self::StepMode => write!(f, "step-mode"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Experiment parameters fixed by `setup_experiment`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Experiment {
    pub start_time: f64,
    pub stop_time: Option<f64>,
    pub tolerance: Option<f64>,
}

/// A running model conforming to the lifecycle contract.
pub struct ComponentInstance<M: Model> {
    model: M,
    registry: VariableRegistry<M>,
    phase: Phase,
    /// Time confirmed by the last completed step.
    current_time: f64,
    experiment: Option<Experiment>,
    logger: Logger,
    data: InstanceData,
}

impl<M: Model> ComponentInstance<M> {
    /// Create an instance that logs through `tracing`.
    pub fn instantiate(
        instance_name: impl Into<String>,
        resource_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        Self::instantiate_with_sink(instance_name, resource_path, Box::new(TracingSink))
    }

    /// Create an instance that logs through the given sink.
    ///
    /// Constructs the model, registers its variables and resets it. A
    /// registration conflict aborts instantiation.
    pub fn instantiate_with_sink(
        instance_name: impl Into<String>,
        resource_path: impl Into<PathBuf>,
        sink: Box<dyn LogSink>,
    ) -> Result<Self> {
        let data = InstanceData::new(instance_name, resource_path);
        let mut model = M::instantiate(&data);
        let mut registry = VariableRegistry::new();
        M::register_variables(&mut registry)?;

        for (variable, dependency) in registry.unresolved_dependencies() {
            warn!(
                instance = %data.instance_name,
                variable,
                dependency,
                "dependency names no registered variable"
            );
        }

        model.reset();
        debug!(
            instance = %data.instance_name,
            model = %M::model_info().model_identifier,
            variables = registry.len(),
            "component instantiated"
        );

        Ok(Self {
            model,
            registry,
            phase: Phase::Instantiated,
            current_time: 0.0,
            experiment: None,
            logger: Logger::new(data.instance_name.clone(), sink),
            data,
        })
    }

    // === Lifecycle ===

    /// Fix the experiment's start time and optional stop time and tolerance.
    pub fn setup_experiment(
        &mut self,
        start_time: f64,
        stop_time: Option<f64>,
        tolerance: Option<f64>,
    ) -> Result<()> {
        const OP: &str = "setup_experiment";
        self.expect_phase(OP, &[Phase::Instantiated])?;
        if !start_time.is_finite() {
            return Err(self.invalid_call(OP, format!("start time {start_time} is not finite")));
        }
        if let Some(stop) = stop_time {
            if stop.is_nan() || stop < start_time {
                return Err(self.invalid_call(
                    OP,
                    format!("stop time {stop} is before start time {start_time}"),
                ));
            }
        }
        if let Some(tol) = tolerance {
            if tol.is_nan() || tol <= 0.0 {
                return Err(self.invalid_call(OP, format!("tolerance {tol} is not positive")));
            }
        }

        self.model.setup_experiment(start_time, stop_time, tolerance);
        self.experiment = Some(Experiment {
            start_time,
            stop_time,
            tolerance,
        });
        self.current_time = start_time;
        self.transition(Phase::Configuration);
        Ok(())
    }

    /// Set up the experiment described by a configuration section.
    pub fn setup_experiment_from(&mut self, config: &ExperimentConfig) -> Result<()> {
        self.setup_experiment(config.start_time, config.stop_time, config.tolerance)
    }

    pub fn enter_initialisation_mode(&mut self) -> Result<()> {
        self.expect_phase("enter_initialisation_mode", &[Phase::Configuration])?;
        self.model.enter_initialisation_mode();
        self.transition(Phase::Initialisation);
        Ok(())
    }

    pub fn exit_initialisation_mode(&mut self) -> Result<()> {
        self.expect_phase("exit_initialisation_mode", &[Phase::Initialisation])?;
        self.model.exit_initialisation_mode();
        self.transition(Phase::StepMode);
        Ok(())
    }

    /// Advance the model by `dt` from the current time.
    ///
    /// `time` is the host's communication point and is handed to the model
    /// as is; the instance's own clock always advances by `dt`. Returns
    /// `Ok(false)` when the model could not complete the step; the current
    /// time is then left where it was.
    pub fn do_step(&mut self, time: f64, dt: f64) -> Result<bool> {
        const OP: &str = "do_step";
        self.expect_phase(OP, &[Phase::StepMode])?;
        if !time.is_finite() {
            return Err(self.invalid_call(OP, format!("step time {time} is not finite")));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(self.invalid_call(OP, format!("step size {dt} is not positive")));
        }
        if let Some(stop) = self.experiment.and_then(|e| e.stop_time) {
            let end = self.current_time + dt;
            if end > stop + 1e-9 * stop.abs().max(1.0) {
                return Err(self.invalid_call(
                    OP,
                    format!("step would end at {end}, past stop time {stop}"),
                ));
            }
        }
        if (time - self.current_time).abs() > 1e-9 * time.abs().max(1.0) {
            debug!(
                instance = %self.data.instance_name,
                expected = self.current_time,
                time,
                "step does not start at the current time"
            );
        }

        let ctx = StepContext::new(time, dt, &self.logger);
        let completed = self.model.do_step(&ctx);
        if completed {
            self.current_time += dt;
        } else {
            debug!(instance = %self.data.instance_name, time, dt, "model rejected step");
        }
        Ok(completed)
    }

    /// Restore the model's starting values and rewind time to zero.
    ///
    /// The phase is unchanged.
    pub fn reset(&mut self) -> Result<()> {
        self.expect_live("reset")?;
        self.model.reset();
        self.current_time = 0.0;
        debug!(instance = %self.data.instance_name, phase = %self.phase, "component reset");
        Ok(())
    }

    pub fn terminate(&mut self) -> Result<()> {
        self.expect_phase("terminate", &[Phase::StepMode])?;
        self.model.terminate();
        self.transition(Phase::Terminated);
        Ok(())
    }

    // === Typed access by value reference ===

    /// Read one variable.
    pub fn get<T: ScalarValue>(&self, vr: ValueReference) -> Result<T> {
        self.expect_live("get")?;
        Ok(self.registry.get_value(&self.model, vr)?)
    }

    /// Write one variable, with the same checks as the bulk setters.
    pub fn set<T: ScalarValue>(&mut self, vr: ValueReference, value: T) -> Result<()> {
        self.set_values("set", &[vr], &[value])
    }

    pub fn get_real(&self, vrs: &[ValueReference]) -> Result<Vec<f64>> {
        self.get_values("get_real", vrs)
    }

    pub fn get_integer(&self, vrs: &[ValueReference]) -> Result<Vec<i32>> {
        self.get_values("get_integer", vrs)
    }

    pub fn get_boolean(&self, vrs: &[ValueReference]) -> Result<Vec<bool>> {
        self.get_values("get_boolean", vrs)
    }

    pub fn get_string(&self, vrs: &[ValueReference]) -> Result<Vec<String>> {
        self.get_values("get_string", vrs)
    }

    pub fn set_real(&mut self, vrs: &[ValueReference], values: &[f64]) -> Result<()> {
        self.set_values("set_real", vrs, values)
    }

    pub fn set_integer(&mut self, vrs: &[ValueReference], values: &[i32]) -> Result<()> {
        self.set_values("set_integer", vrs, values)
    }

    pub fn set_boolean(&mut self, vrs: &[ValueReference], values: &[bool]) -> Result<()> {
        self.set_values("set_boolean", vrs, values)
    }

    pub fn set_string<S: AsRef<str>>(
        &mut self,
        vrs: &[ValueReference],
        values: &[S],
    ) -> Result<()> {
        let owned: Vec<String> = values.iter().map(|s| s.as_ref().to_owned()).collect();
        self.set_values("set_string", vrs, &owned)
    }

    fn get_values<T: ScalarValue>(
        &self,
        operation: &'static str,
        vrs: &[ValueReference],
    ) -> Result<Vec<T>> {
        self.expect_live(operation)?;
        vrs.iter()
            .map(|&vr| {
                self.registry
                    .get_value(&self.model, vr)
                    .map_err(ComponentError::from)
            })
            .collect()
    }

    /// Validate every handle, then write. Nothing is written unless every
    /// handle passes.
    fn set_values<T: ScalarValue>(
        &mut self,
        operation: &'static str,
        vrs: &[ValueReference],
        values: &[T],
    ) -> Result<()> {
        self.expect_live(operation)?;
        if !self.phase.accepts_writes() {
            return Err(self.invalid_call(
                operation,
                "variables cannot be set once initialisation has exited".to_string(),
            ));
        }
        if vrs.len() != values.len() {
            return Err(self.invalid_call(
                operation,
                format!("{} value references but {} values", vrs.len(), values.len()),
            ));
        }
        for &vr in vrs {
            let variable = self.registry.require(T::TYPE, vr)?;
            if !variable.causality().is_host_writable() {
                let detail = format!(
                    "variable '{}' has causality {} and cannot be set",
                    variable.name(),
                    variable.causality()
                );
                return Err(self.invalid_call(operation, detail));
            }
        }

        for (&vr, value) in vrs.iter().zip(values) {
            self.registry.set_value(&mut self.model, vr, value.clone())?;
        }
        Ok(())
    }

    // === Accessors by name ===

    /// Typed accessor for the named variable, if it exists with type `T`.
    pub fn variable<T: ScalarValue>(&self, name: &str) -> Option<Accessor<M, T>> {
        let variable = self.registry.lookup_by_name(name)?;
        let lens = variable.lens::<T>()?;
        Some(Accessor::new(variable.name(), variable.value_reference(), lens))
    }

    pub fn get_real_variable(&self, name: &str) -> Option<RealVariable<M>> {
        self.variable(name)
    }

    pub fn get_int_variable(&self, name: &str) -> Option<IntVariable<M>> {
        self.variable(name)
    }

    pub fn get_bool_variable(&self, name: &str) -> Option<BoolVariable<M>> {
        self.variable(name)
    }

    pub fn get_string_variable(&self, name: &str) -> Option<StringVariable<M>> {
        self.variable(name)
    }

    // === Logging ===

    pub fn set_debug_logging(&mut self, enabled: bool, categories: Vec<String>) {
        self.logger.set_debug_logging(enabled, categories);
    }

    /// Apply a logging configuration section.
    pub fn configure_logging(&mut self, config: &LoggingConfig) {
        self.set_debug_logging(config.debug, config.categories.clone());
    }

    // === Introspection ===

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn experiment(&self) -> Option<&Experiment> {
        self.experiment.as_ref()
    }

    pub fn instance_name(&self) -> &str {
        &self.data.instance_name
    }

    pub fn resource_path(&self) -> &Path {
        &self.data.resource_path
    }

    pub fn registry(&self) -> &VariableRegistry<M> {
        &self.registry
    }

    /// Read-only view of the model. Mutation goes through the validated
    /// entry points only.
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_info(&self) -> ModelInfo {
        M::model_info()
    }

    // === Phase checks ===

    fn expect_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<()> {
        if allowed.contains(&self.phase) {
            return Ok(());
        }
        let expected: Vec<String> = allowed.iter().map(Phase::to_string).collect();
        Err(self.invalid_call(operation, format!("expected {}", expected.join(" or "))))
    }

    pub(crate) fn expect_live(&self, operation: &'static str) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(self.invalid_call(operation, "instance is terminated".to_string()));
        }
        Ok(())
    }

    fn invalid_call(&self, operation: &'static str, detail: String) -> ComponentError {
        warn!(
            instance = %self.data.instance_name,
            operation,
            phase = %self.phase,
            %detail,
            "rejected call"
        );
        ComponentError::InvalidCall {
            operation,
            phase: self.phase,
            detail,
        }
    }

    fn transition(&mut self, to: Phase) {
        debug!(
            instance = %self.data.instance_name,
            from = %self.phase,
            to = %to,
            "phase transition"
        );
        self.phase = to;
    }
}

impl<M: Model> fmt::Debug for ComponentInstance<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("instance_name", &self.data.instance_name)
            .field("phase", &self.phase)
            .field("current_time", &self.current_time)
            .field("variables", &self.registry.len())
            .finish_non_exhaustive()
    }
}
