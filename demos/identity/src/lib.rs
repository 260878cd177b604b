//! Identity: a feed-through model.
//!
//! Every input is paired with an output of the same type that reads the
//! same storage, so a value written to `realIn` is visible on `realOut`
//! straight away. The host may write the inputs; the outputs stay
//! read-only.

use cosim_runtime::{
    field, Causality, ComponentInstance, Initial, InstanceData, Model, ModelInfo, RegistryError,
    Status, StepContext, Variability, VariableRegistry, VariableSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    integer: i32,
    real: f64,
    boolean: bool,
    string: String,
}

/// Register an input/output pair over one field.
macro_rules! feed_through {
    ($registry:expr, $ctor:ident, $input:literal, $output:literal, $field:ident) => {{
        $registry.register(
            VariableSpec::$ctor($input, field!(Identity, $field))
                .causality(Causality::Input)
                .variability(Variability::Discrete),
        )?;
        $registry.register(
            VariableSpec::$ctor($output, field!(Identity, $field))
                .causality(Causality::Output)
                .variability(Variability::Discrete)
                .initial(Initial::Calculated)
                .depends_on([$input]),
        )?;
    }};
}

impl Model for Identity {
    fn instantiate(_data: &InstanceData) -> Self {
        Self {
            integer: 0,
            real: 0.0,
            boolean: false,
            string: String::new(),
        }
    }

    fn register_variables(registry: &mut VariableRegistry<Self>) -> Result<(), RegistryError> {
        feed_through!(registry, integer, "integerIn", "integerOut", integer);
        feed_through!(registry, real, "realIn", "realOut", real);
        feed_through!(registry, boolean, "booleanIn", "booleanOut", boolean);
        feed_through!(registry, string, "stringIn", "stringOut", string);
        Ok(())
    }

    fn do_step(&mut self, ctx: &StepContext<'_>) -> bool {
        ctx.log(Status::Ok, &format!("hello@ {}", ctx.current_time()));
        true
    }

    fn reset(&mut self) {
        self.integer = 0;
        self.real = 0.0;
        self.boolean = false;
        self.string = "empty".to_string();
    }

    fn model_info() -> ModelInfo {
        ModelInfo::new("Identity")
            .with_name("Identity")
            .with_description("A simple feed-through model")
    }
}

/// Create an identity instance logging through `tracing`.
pub fn instantiate(instance_name: &str) -> cosim_runtime::Result<ComponentInstance<Identity>> {
    ComponentInstance::instantiate(instance_name, "")
}
