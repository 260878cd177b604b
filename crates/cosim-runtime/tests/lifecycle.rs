//! Lifecycle and variable-access behaviour of component instances.

use std::cell::RefCell;
use std::rc::Rc;

use cosim_runtime::{
    field, Causality, ComponentError, ComponentInstance, InstanceData, Initial, LogSink, Model,
    ModelInfo, Phase, RegistryError, SimulationConfig, Status, StepContext, ValueReference,
    Variability, VariableRegistry, VariableSpec, VariableType,
};

/// Counts steps and mirrors the count into every value type.
struct Counter {
    real: f64,
    integer: i32,
    boolean: bool,
    string: String,
    gain: f64,
}

impl Model for Counter {
    fn instantiate(_data: &InstanceData) -> Self {
        Self {
            real: 0.0,
            integer: 0,
            boolean: false,
            string: String::new(),
            gain: 1.0,
        }
    }

    fn register_variables(registry: &mut VariableRegistry<Self>) -> Result<(), RegistryError> {
        registry.register(
            VariableSpec::real("myReal", field!(Counter, real))
                .causality(Causality::Output)
                .variability(Variability::Discrete),
        )?;
        registry.register(
            VariableSpec::integer("myInteger", field!(Counter, integer))
                .causality(Causality::Output),
        )?;
        registry.register(
            VariableSpec::boolean("myBoolean", field!(Counter, boolean))
                .causality(Causality::Output),
        )?;
        registry.register(
            VariableSpec::string("myString", field!(Counter, string))
                .causality(Causality::Output),
        )?;
        registry.register(
            VariableSpec::real("gain", field!(Counter, gain))
                .causality(Causality::Parameter)
                .variability(Variability::Tunable)
                .initial(Initial::Exact),
        )?;
        Ok(())
    }

    fn do_step(&mut self, ctx: &StepContext<'_>) -> bool {
        self.real = ctx.current_time() * self.gain;
        self.integer += 1;
        self.boolean = !self.boolean;
        self.string = self.integer.to_string();
        ctx.log_category(Status::Ok, "step", &format!("step {}", self.integer));
        true
    }

    fn reset(&mut self) {
        self.real = 0.0;
        self.integer = 0;
        self.boolean = false;
        self.string = "0".to_string();
        self.gain = 1.0;
    }

    fn model_info() -> ModelInfo {
        ModelInfo::new("Counter").with_description("Counts steps")
    }
}

fn counter() -> ComponentInstance<Counter> {
    ComponentInstance::instantiate("counter", "/tmp/resources").expect("instantiate")
}

fn stepping_counter() -> ComponentInstance<Counter> {
    let mut inst = counter();
    inst.setup_experiment(0.0, None, None).expect("setup");
    inst.enter_initialisation_mode().expect("enter init");
    inst.exit_initialisation_mode().expect("exit init");
    inst
}

#[test]
fn basic_scenario() {
    let mut inst = counter();
    inst.setup_experiment(0.0, None, None).unwrap();
    inst.enter_initialisation_mode().unwrap();
    inst.exit_initialisation_mode().unwrap();

    let real = inst.get_real_variable("myReal").expect("myReal");
    let integer = inst.get_int_variable("myInteger").expect("myInteger");
    let boolean = inst.get_bool_variable("myBoolean").expect("myBoolean");
    let string = inst.get_string_variable("myString").expect("myString");

    let err = inst
        .set_boolean(&[boolean.value_reference()], &[true])
        .unwrap_err();
    assert!(err.is_invalid_call(), "output write must be rejected: {err}");

    let dt = 0.1;
    let mut t = 0.0;
    let mut i = 0;
    while t < 10.0 - 1e-9 {
        assert!(inst.do_step(t, dt).unwrap());
        i += 1;

        assert!((real.get(&inst).unwrap() - t).abs() < 1e-12, "real at step {i}");
        assert_eq!(boolean.get(&inst).unwrap(), (i - 1) % 2 == 0, "boolean at step {i}");
        assert_eq!(integer.get(&inst).unwrap(), i);
        assert_eq!(string.get(&inst).unwrap(), i.to_string());

        t += dt;
    }
    assert_eq!(i, 100);

    inst.reset().unwrap();
    assert_eq!(real.get(&inst).unwrap(), 0.0);
    assert!(!boolean.get(&inst).unwrap());
    assert_eq!(integer.get(&inst).unwrap(), 0);
    assert_eq!(string.get(&inst).unwrap(), "0");

    inst.terminate().unwrap();
    assert!(inst.terminate().unwrap_err().is_invalid_call());
}

#[test]
fn lookups_by_name_and_handle_agree() {
    let inst = counter();
    for variable in inst.registry().iter() {
        let by_name = inst.registry().lookup_by_name(variable.name()).unwrap();
        let by_handle = inst
            .registry()
            .lookup_by_handle(variable.value_type(), variable.value_reference())
            .unwrap();
        assert!(by_name.descriptor().same_kind(by_handle.descriptor()));
        assert_eq!(by_name.name(), by_handle.name());
    }
    assert_eq!(inst.registry().len(), 5);
    assert_eq!(inst.registry().variables_of(VariableType::Real).len(), 2);
}

#[test]
fn handles_are_per_type() {
    let inst = counter();
    assert_eq!(
        inst.get_real_variable("myReal").unwrap().value_reference(),
        ValueReference(0)
    );
    assert_eq!(
        inst.get_int_variable("myInteger").unwrap().value_reference(),
        ValueReference(0)
    );
    assert_eq!(
        inst.get_real_variable("gain").unwrap().value_reference(),
        ValueReference(1)
    );
}

#[test]
fn instantiation_resets_model() {
    let inst = counter();
    assert_eq!(inst.phase(), Phase::Instantiated);
    assert_eq!(inst.get_string(&[ValueReference(0)]).unwrap(), vec!["0"]);
    assert_eq!(inst.instance_name(), "counter");
    assert_eq!(inst.resource_path().to_str(), Some("/tmp/resources"));
    assert_eq!(inst.model_info().model_identifier, "Counter");
}

#[test]
fn output_rejected_right_after_instantiation() {
    let mut inst = counter();
    let vr = inst.get_int_variable("myInteger").unwrap().value_reference();
    let err = inst.set_integer(&[vr], &[5]).unwrap_err();
    assert!(err.is_invalid_call());
    assert_eq!(inst.get_integer(&[vr]).unwrap(), vec![0]);
}

#[test]
fn parameter_round_trip() {
    let mut inst = counter();
    let gain = inst.get_real_variable("gain").unwrap();
    for value in [2.5, -0.0, 1e300] {
        inst.set_real(&[gain.value_reference()], &[value]).unwrap();
        assert_eq!(gain.get(&inst).unwrap(), value);
        assert_eq!(inst.get::<f64>(gain.value_reference()).unwrap(), value);
    }
}

#[test]
fn parameter_scales_output() {
    let mut inst = counter();
    let gain = inst.get_real_variable("gain").unwrap().value_reference();
    inst.set_real(&[gain], &[2.0]).unwrap();
    inst.setup_experiment(0.0, None, None).unwrap();
    inst.enter_initialisation_mode().unwrap();
    inst.exit_initialisation_mode().unwrap();
    inst.do_step(0.0, 0.5).unwrap();
    inst.do_step(0.5, 0.5).unwrap();
    let real = inst.get_real_variable("myReal").unwrap();
    assert_eq!(real.get(&inst).unwrap(), 1.0);
}

#[test]
fn step_before_exit_and_after_terminate_rejected() {
    let mut inst = counter();
    assert!(inst.do_step(0.0, 0.1).unwrap_err().is_invalid_call());

    let mut inst = stepping_counter();
    inst.terminate().unwrap();
    let err = inst.do_step(0.0, 0.1).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::InvalidCall {
            phase: Phase::Terminated,
            ..
        }
    ));
}

#[test]
fn wrong_call_order_leaves_phase_unchanged() {
    let mut inst = counter();
    assert!(inst.exit_initialisation_mode().is_err());
    assert_eq!(inst.phase(), Phase::Instantiated);

    inst.setup_experiment(0.0, Some(1.0), None).unwrap();
    assert!(inst.terminate().is_err());
    assert_eq!(inst.phase(), Phase::Configuration);

    inst.enter_initialisation_mode().unwrap();
    assert!(inst.enter_initialisation_mode().is_err());
    assert_eq!(inst.phase(), Phase::Initialisation);
}

/// Every registered variable's current value, keyed by name.
fn snapshot(inst: &ComponentInstance<Counter>) -> Vec<(String, String)> {
    inst.registry()
        .iter()
        .map(|v| {
            let vr = v.value_reference();
            let value = match v.value_type() {
                VariableType::Real => format!("{:?}", inst.get::<f64>(vr).unwrap()),
                VariableType::Integer => format!("{:?}", inst.get::<i32>(vr).unwrap()),
                VariableType::Boolean => format!("{:?}", inst.get::<bool>(vr).unwrap()),
                VariableType::String => format!("{:?}", inst.get::<String>(vr).unwrap()),
            };
            (v.name().to_string(), value)
        })
        .collect()
}

#[test]
fn reset_restores_values_after_instantiation() {
    let mut inst = counter();
    let baseline = snapshot(&inst);
    assert_eq!(baseline.len(), inst.registry().len());

    let gain = inst.get_real_variable("gain").unwrap();
    inst.set_real(&[gain.value_reference()], &[2.0]).unwrap();
    inst.setup_experiment(0.0, None, None).unwrap();
    inst.enter_initialisation_mode().unwrap();
    inst.exit_initialisation_mode().unwrap();
    for k in 0..7 {
        inst.do_step(k as f64 * 0.1, 0.1).unwrap();
    }
    assert_ne!(snapshot(&inst), baseline);

    inst.reset().unwrap();
    assert_eq!(snapshot(&inst), baseline);
    assert_eq!(gain.get(&inst).unwrap(), 1.0);
    assert_eq!(inst.phase(), Phase::StepMode);
    assert_eq!(inst.current_time(), 0.0);

    inst.do_step(0.0, 0.1).unwrap();
    inst.reset().unwrap();
    assert_eq!(snapshot(&inst), baseline);
}

#[test]
fn stepping_resumes_after_reset() {
    let mut inst = stepping_counter();
    inst.do_step(0.0, 0.1).unwrap();
    inst.reset().unwrap();
    assert!(inst.do_step(0.0, 0.1).unwrap());
    assert_eq!(inst.get_int_variable("myInteger").unwrap().get(&inst).unwrap(), 1);
}

#[test]
fn unknown_handle_rejected() {
    let inst = counter();
    let err = inst.get_real(&[ValueReference(99)]).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Registry(RegistryError::UnknownVariable {
            value_type: VariableType::Real,
            ..
        })
    ));
}

#[test]
fn empty_bulk_calls_succeed() {
    let mut inst = counter();
    assert!(inst.get_boolean(&[]).unwrap().is_empty());
    inst.set_string::<&str>(&[], &[]).unwrap();
}

#[test]
fn instances_do_not_share_state() {
    let mut a = stepping_counter();
    let mut b = stepping_counter();
    for k in 0..3 {
        a.do_step(k as f64, 1.0).unwrap();
    }
    b.do_step(0.0, 1.0).unwrap();
    let integer = a.get_int_variable("myInteger").unwrap();
    assert_eq!(integer.get(&a).unwrap(), 3);
    assert_eq!(integer.get(&b).unwrap(), 1);
}

type Captured = Rc<RefCell<Vec<(String, Status, String, String)>>>;

struct Capture(Captured);

impl LogSink for Capture {
    fn log(&self, instance_name: &str, status: Status, category: &str, message: &str) {
        self.0.borrow_mut().push((
            instance_name.to_string(),
            status,
            category.to_string(),
            message.to_string(),
        ));
    }
}

#[test]
fn step_logs_reach_custom_sink() {
    let captured: Captured = Rc::default();
    let mut inst = ComponentInstance::<Counter>::instantiate_with_sink(
        "logged",
        "",
        Box::new(Capture(captured.clone())),
    )
    .unwrap();

    let config = SimulationConfig::parse(
        r#"
[experiment]
stop-time = 1.0

[logging]
debug = true
categories = ["step"]
"#,
    )
    .unwrap();
    inst.configure_logging(&config.logging);
    inst.setup_experiment_from(&config.experiment).unwrap();
    inst.enter_initialisation_mode().unwrap();
    inst.exit_initialisation_mode().unwrap();
    inst.do_step(0.0, 0.5).unwrap();
    inst.do_step(0.5, 0.5).unwrap();

    let got = captured.borrow();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].0, "logged");
    assert_eq!(got[1].2, "step");
    assert_eq!(got[1].3, "step 2");
}

#[test]
fn debug_messages_suppressed_by_default() {
    let captured: Captured = Rc::default();
    let mut inst = ComponentInstance::<Counter>::instantiate_with_sink(
        "quiet",
        "",
        Box::new(Capture(captured.clone())),
    )
    .unwrap();
    inst.setup_experiment(0.0, None, None).unwrap();
    inst.enter_initialisation_mode().unwrap();
    inst.exit_initialisation_mode().unwrap();
    inst.do_step(0.0, 0.1).unwrap();
    assert!(captured.borrow().is_empty());
}

/// Registers two variables under one name.
struct Doubled {
    x: f64,
}

impl Model for Doubled {
    fn instantiate(_data: &InstanceData) -> Self {
        Self { x: 0.0 }
    }

    fn register_variables(registry: &mut VariableRegistry<Self>) -> Result<(), RegistryError> {
        registry.register(VariableSpec::real("x", field!(Doubled, x)))?;
        registry.register(VariableSpec::real("x", field!(Doubled, x)))?;
        Ok(())
    }

    fn do_step(&mut self, _ctx: &StepContext<'_>) -> bool {
        true
    }

    fn reset(&mut self) {
        self.x = 0.0;
    }

    fn model_info() -> ModelInfo {
        ModelInfo::new("Doubled")
    }
}

#[test]
fn duplicate_name_fails_instantiation() {
    let err = ComponentInstance::<Doubled>::instantiate("dup", "").unwrap_err();
    assert!(err.is_duplicate_variable());
    assert!(matches!(
        err,
        ComponentError::Registry(RegistryError::DuplicateName { ref name }) if name == "x"
    ));
}
