//! Counter: a model with one output of every value type.
//!
//! Each step copies the step's start time into `myReal`, increments
//! `myInteger`, toggles `myBoolean` and writes the count into `myString`.
//! After a reset the outputs read `0.0`, `0`, `false` and `"0"`.

use cosim_runtime::{
    field, Causality, ComponentInstance, InstanceData, Model, ModelInfo, RegistryError, Status,
    StepContext, Variability, VariableRegistry, VariableSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    real: f64,
    integer: i32,
    boolean: bool,
    string: String,
}

impl Model for Counter {
    fn instantiate(_data: &InstanceData) -> Self {
        Self {
            real: 0.0,
            integer: 0,
            boolean: false,
            string: String::new(),
        }
    }

    fn register_variables(registry: &mut VariableRegistry<Self>) -> Result<(), RegistryError> {
        registry.register(
            VariableSpec::real("myReal", field!(Counter, real))
                .causality(Causality::Output)
                .variability(Variability::Discrete)
                .description("Start time of the last step"),
        )?;
        registry.register(
            VariableSpec::integer("myInteger", field!(Counter, integer))
                .causality(Causality::Output)
                .description("Number of completed steps"),
        )?;
        registry.register(
            VariableSpec::boolean("myBoolean", field!(Counter, boolean))
                .causality(Causality::Output)
                .description("Flips on every step"),
        )?;
        registry.register(
            VariableSpec::string("myString", field!(Counter, string))
                .causality(Causality::Output)
                .depends_on(["myInteger"]),
        )?;
        Ok(())
    }

    fn do_step(&mut self, ctx: &StepContext<'_>) -> bool {
        self.real = ctx.current_time();
        self.integer += 1;
        self.boolean = !self.boolean;
        self.string = self.integer.to_string();
        ctx.log_category(
            Status::Ok,
            "step",
            &format!("step {} at t={}", self.integer, self.real),
        );
        true
    }

    fn reset(&mut self) {
        self.real = 0.0;
        self.integer = 0;
        self.boolean = false;
        self.string = "0".to_string();
    }

    fn model_info() -> ModelInfo {
        ModelInfo::new("Counter")
            .with_name("Counter")
            .with_description("Counts steps and mirrors the count into every value type")
    }
}

/// Create a counter instance logging through `tracing`.
pub fn instantiate(instance_name: &str) -> cosim_runtime::Result<ComponentInstance<Counter>> {
    ComponentInstance::instantiate(instance_name, "")
}
