//! Identity — binary entry point.
//!
//! Usage:
//!   cargo run -p identity [-- --real 2.5 --integer 3 --boolean --string hi]
//!
//! Writes the given inputs during initialisation, takes a few steps and
//! prints what the outputs report.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cosim_runtime::{SimulationConfig, VariableType};

#[derive(Parser)]
#[command(name = "identity", about = "Feed values through the identity model")]
struct Cli {
    /// Simulation configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 0.0)]
    real: f64,
    #[arg(long, default_value_t = 0)]
    integer: i32,
    #[arg(long)]
    boolean: bool,
    #[arg(long, default_value = "empty")]
    string: String,
    /// Number of steps to take
    #[arg(long, default_value_t = 3)]
    steps: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let mut inst = identity::instantiate("identity")?;
    inst.configure_logging(&config.logging);
    inst.setup_experiment_from(&config.experiment)?;
    inst.enter_initialisation_mode()?;

    let vr = |name: &str| {
        inst.registry()
            .lookup_by_name(name)
            .map(|v| v.value_reference())
            .with_context(|| format!("model has no variable {name}"))
    };
    let (real_in, integer_in) = (vr("realIn")?, vr("integerIn")?);
    let (boolean_in, string_in) = (vr("booleanIn")?, vr("stringIn")?);

    inst.set_real(&[real_in], &[cli.real])?;
    inst.set_integer(&[integer_in], &[cli.integer])?;
    inst.set_boolean(&[boolean_in], &[cli.boolean])?;
    inst.set_string(&[string_in], &[cli.string.as_str()])?;
    inst.exit_initialisation_mode()?;

    let step_size = config.experiment.step_size;
    for k in 0..cli.steps {
        let t = config.experiment.start_time + f64::from(k) * step_size;
        inst.do_step(t, step_size)?;
    }

    for name in ["realOut", "integerOut", "booleanOut", "stringOut"] {
        let variable = inst
            .registry()
            .lookup_by_name(name)
            .with_context(|| format!("model has no variable {name}"))?;
        let vr = variable.value_reference();
        let value = match variable.value_type() {
            VariableType::Real => inst.get::<f64>(vr)?.to_string(),
            VariableType::Integer => inst.get::<i32>(vr)?.to_string(),
            VariableType::Boolean => inst.get::<bool>(vr)?.to_string(),
            VariableType::String => inst.get::<String>(vr)?,
        };
        println!("{name:>10} = {value}");
    }

    inst.terminate()?;
    Ok(())
}
