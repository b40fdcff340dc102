//! # RMCS Control Unit
//!
//! Loads the robot configuration, builds the shared runtime, spawns the
//! command, capacitor, chassis, gimbal and launcher tasks plus the simulated
//! device bus, and runs until Ctrl-C or the requested duration. Per-task
//! cycle statistics are logged at shutdown.

use clap::Parser;
use rmcs_control_unit::config::{RobotConfig, load_config};
use rmcs_control_unit::cycle::{rt_setup, spawn_task};
use rmcs_control_unit::runtime::Runtime;
use rmcs_control_unit::sim::{SimBus, SimOptions};
use rmcs_control_unit::task::spawn_control_tasks;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// RMCS Control Unit: real-time robot control core
#[derive(Parser, Debug)]
#[command(name = "rmcs_control_unit")]
#[command(version)]
#[command(about = "Fixed-rate chassis/gimbal/launcher/capacitor control pipeline")]
struct Args {
    /// Path to the robot configuration TOML.
    #[arg(long, default_value = "config/robot.toml")]
    config: PathBuf,

    /// Run for this many seconds, then shut down (0 = until Ctrl-C).
    #[arg(long, default_value_t = 0.0)]
    duration_s: f64,

    /// Simulation: cut capacitor feedback at this time [s].
    #[arg(long)]
    cap_dropout_s: Option<f64>,

    /// Simulation: cut the remote control at this time [s].
    #[arg(long)]
    rc_offline_s: Option<f64>,

    /// Simulation: length of each injected outage [s].
    #[arg(long, default_value_t = 1.0)]
    outage_s: f64,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args.config);

    let level = match (&config, args.verbose) {
        (_, true) => Level::DEBUG,
        (Ok(cfg), false) => cfg.shared.log_level.as_level(),
        (Err(_), false) => Level::INFO,
    };
    setup_tracing(&args, level);

    info!("RMCS Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|cfg| run(&args, cfg));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("RMCS Control Unit shutdown complete");
}

fn seconds(s: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    Ok(Duration::try_from_secs_f64(s)?)
}

fn run(args: &Args, config: RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let t = &config.tasks;
    info!(
        robot = %config.shared.robot_name,
        cmd_hz = t.cmd.freq_hz,
        chassis_hz = t.chassis.freq_hz,
        gimbal_hz = t.gimbal.freq_hz,
        launcher_hz = t.launcher.freq_hz,
        cap_hz = t.cap.freq_hz,
        "Config OK"
    );

    let sim_options = SimOptions {
        cap_dropout_at: args.cap_dropout_s.map(seconds).transpose()?,
        rc_offline_at: args.rc_offline_s.map(seconds).transpose()?,
        outage: seconds(args.outage_s)?,
    };
    let run_for = seconds(args.duration_s)?;

    rt_setup()?;
    info!("RT setup complete");

    let rt = Arc::new(Runtime::new(config));

    let r = Arc::clone(&rt);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.stop();
    })?;

    let mut handles = spawn_control_tasks(&rt)?;
    let sim_spec = rt.config.tasks.sim;
    handles.push(spawn_task(SimBus::new(sim_options), Arc::clone(&rt), sim_spec)?);

    let started = Instant::now();
    while rt.is_running() {
        if !run_for.is_zero() && started.elapsed() >= run_for {
            info!(seconds = args.duration_s, "Run duration reached");
            rt.stop();
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    for handle in handles {
        let name = handle.name();
        match handle.join() {
            Ok(stats) => info!(
                task = name,
                cycles = stats.cycle_count,
                avg_ns = stats.avg_cycle_ns(),
                max_ns = stats.max_cycle_ns,
                stddev_ns = stats.stddev_cycle_ns() as i64,
                max_latency_ns = stats.max_latency_ns,
                overruns = stats.overruns,
                skipped = stats.skipped,
                "Task stats"
            ),
            Err(e) => error!("{e}"),
        }
    }

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: Level) {
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
