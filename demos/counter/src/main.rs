//! Counter — binary entry point.
//!
//! Usage:
//!   cargo run -p counter [-- --config <sim.toml>]
//!
//! Runs the counter from its start time to its stop time and prints the
//! outputs after every step. Without a configuration the experiment spans
//! 0 to 1 with a step size of 0.1.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cosim_runtime::{ExperimentConfig, SimulationConfig};

#[derive(Parser)]
#[command(name = "counter", about = "Step the counter model through an experiment")]
struct Cli {
    /// Simulation configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Instance name reported in log messages
    #[arg(long, default_value = "counter")]
    instance: String,
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
        None => SimulationConfig {
            experiment: ExperimentConfig {
                stop_time: Some(1.0),
                ..Default::default()
            },
            ..Default::default()
        },
    };

    let mut inst = counter::instantiate(&cli.instance)?;
    inst.configure_logging(&config.logging);
    inst.setup_experiment_from(&config.experiment)?;
    inst.enter_initialisation_mode()?;
    inst.exit_initialisation_mode()?;

    let real = inst
        .get_real_variable("myReal")
        .context("model has no myReal output")?;
    let integer = inst
        .get_int_variable("myInteger")
        .context("model has no myInteger output")?;
    let boolean = inst
        .get_bool_variable("myBoolean")
        .context("model has no myBoolean output")?;
    let string = inst
        .get_string_variable("myString")
        .context("model has no myString output")?;

    let exp = &config.experiment;
    let steps = exp.step_count().unwrap_or(10);
    info!(steps, step_size = exp.step_size, "running experiment");

    println!("{:>8} {:>8} {:>6} {:>6} {:>6}", "time", "real", "int", "bool", "str");
    for k in 0..steps {
        let t = exp.start_time + k as f64 * exp.step_size;
        let dt = match exp.stop_time {
            Some(stop) => exp.step_size.min(stop - t),
            None => exp.step_size,
        };
        if !inst.do_step(t, dt)? {
            anyhow::bail!("model refused the step at t={t}");
        }
        println!(
            "{:>8.3} {:>8.3} {:>6} {:>6} {:>6}",
            inst.current_time(),
            real.get(&inst)?,
            integer.get(&inst)?,
            boolean.get(&inst)?,
            string.get(&inst)?
        );
    }

    inst.terminate()?;
    info!(instance = inst.instance_name(), "experiment finished");
    Ok(())
}
