//! # Velo Control Unit
//!
//! Runs a PI velocity controller against a simulated first-order motor for a
//! configured number of cycles and reports how closely it tracked the
//! setpoint.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use velo_common::consts::DEFAULT_CONFIG_PATH;
use velo_control_unit::clock::MonotonicClock;
use velo_control_unit::config::{VelocityUnitConfig, load_config};
use velo_control_unit::cycle::CycleRunner;
use velo_control_unit::error::CycleError;

/// Velo Control Unit: PI velocity loop
#[derive(Parser, Debug)]
#[command(name = "velo_control_unit")]
#[command(version)]
#[command(about = "Closed-loop PI velocity control against a simulated motor")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override `cycle.max_cycles`.
    #[arg(long)]
    cycles: Option<u64>,

    /// Override `controller.setpoint` [rad/s].
    #[arg(long, allow_negative_numbers = true)]
    setpoint: Option<f64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);
    let configured_level = loaded.as_ref().ok().map(|c| Level::from(c.shared.log_level));
    setup_tracing(&args, configured_level);

    info!("Velo Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("FATAL: {}: {e}", args.config.display());
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Velo Control Unit shutdown complete");
}

/// Apply CLI overrides, then build and drive the loop.
///
/// Overrides are validated together with the rest of the file, so a
/// non-finite `--setpoint` surfaces as `CycleError::Config`.
fn run(args: &Args, mut config: VelocityUnitConfig) -> Result<(), CycleError> {
    if let Some(cycles) = args.cycles {
        config.cycle.max_cycles = cycles;
    }
    if let Some(setpoint) = args.setpoint {
        config.controller.setpoint = setpoint;
    }

    let clock = MonotonicClock::new(config.controller.clock_resolution);
    let mut runner = CycleRunner::from_config(&config, clock)?;

    info!(
        service = %config.shared.service_name,
        kp = config.controller.kp,
        ki = config.controller.ki,
        setpoint = config.controller.setpoint,
        effort_min = config.controller.effort_min,
        effort_max = config.controller.effort_max,
        "Config OK"
    );

    let stats = runner.run()?.clone();
    if stats.overruns > 0 {
        warn!(overruns = stats.overruns, "cycle budget exceeded");
    }

    let snapshot = runner.controller().snapshot();
    let velocity = runner.plant().velocity();
    info!(
        velocity,
        setpoint = snapshot.setpoint,
        error = snapshot.setpoint - velocity,
        effort = snapshot.output,
        integrator = snapshot.integrator,
        cycles = stats.cycle_count,
        min_cycle_ns = stats.min_cycle_ns,
        max_cycle_ns = stats.max_cycle_ns,
        avg_cycle_ns = stats.avg_cycle_ns(),
        "Final state"
    );

    Ok(())
}

/// Setup tracing subscriber from CLI flags and the configured log level.
fn setup_tracing(args: &Args, configured: Option<Level>) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
