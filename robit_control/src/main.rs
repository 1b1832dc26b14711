//! # Robit Control
//!
//! Loads the robot configuration, builds the simulated hardware rig, starts
//! the periodic control tasks and plays the configured match plan through
//! the mode-entry hook.

use clap::Parser;
use robit_common::config::{ConfigLoader, LogLevel, RobotConfig};
use robit_common::control::error::TaskFault;
use robit_control::clock::MonotonicClock;
use robit_control::config::load_config;
use robit_control::match_plan::{run_match, wait_cancellable};
use robit_control::scheduler::Scheduler;
use robit_hal::SimulationRig;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Robit Control: periodic actuator control on the simulation rig
#[derive(Parser, Debug)]
#[command(name = "robit_control")]
#[command(version)]
#[command(about = "Periodic actuator control for the Robit competition robot")]
struct Args {
    /// Path to the robot configuration TOML.
    #[arg(default_value = "config/robit.toml")]
    config: PathBuf,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Keep the tasks running in Disabled after the match plan until Ctrl-C.
    #[arg(long)]
    hold: bool,
}

fn main() {
    let args = Args::parse();
    // Level from the document if it parses; load errors are reported by `run`.
    let level = RobotConfig::load(&args.config)
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Robit Control v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Robit Control shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_config(&args.config)?;
    let config = loaded.config;
    info!(
        layout = ?config.drive.layout,
        sensing = ?config.winch.sensing,
        phases = config.match_plan.phases.len(),
        "Config OK"
    );

    let (hardware, _probe) = SimulationRig::build(&config)?;
    let plan = config.match_plan.clone();
    let mut scheduler = Scheduler::new(config, hardware, Arc::new(MonotonicClock::new()));
    let shared = scheduler.shared();
    if !loaded.clamped.is_empty() {
        shared.record_config_faults(TaskFault::CONFIG_CLAMPED);
    }

    let handler_shared = Arc::clone(&shared);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        handler_shared.request_shutdown();
    })?;

    let hold = args.hold;
    let report = scheduler.run(|shared| {
        let clock = MonotonicClock::new();
        let report = run_match(shared, &plan, &clock);
        if hold && !report.interrupted {
            info!("holding in Disabled until Ctrl-C");
            while wait_cancellable(shared, &clock, Duration::from_secs(1)) {}
        }
        report
    })?;

    info!(
        completed = report.phases_completed,
        interrupted = report.interrupted,
        "scheduler stopped"
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

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
