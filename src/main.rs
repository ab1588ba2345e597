//! # Stick Conditioner
//!
//! Runs the stick conditioning pipeline against a simulated ADC.
//!
//! Each control cycle samples all four axes, maps them through the persisted
//! calibration and clamps each stick to its circular envelope. The left stick
//! is printed at a limited rate for operator debugging.
//!
//! # Operator Commands (stdin)
//!
//! | Command | Effect |
//! |---------|--------|
//! | `cal` | Re-measure the rest position and persist it |
//! | `dz <n>` | Set the inner deadzone (ignored if negative) |
//! | `stick <axis> <raw>` | Move a simulated axis (`lx`, `ly`, `rx`, `ry`) |
//! | `status` | Print the active calibration |
//!
//! # Examples
//!
//! ```bash
//! cargo run --release -- config/default.toml
//! ```

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use stick_conditioner::config::{Config, LoggingConfig};
use stick_conditioner::sticks::calibration::StdDelay;
use stick_conditioner::sticks::diagnostics::DiagnosticThrottle;
use stick_conditioner::sticks::sampler::{Axis, Sampler, SimulatedAdc};
use stick_conditioner::sticks::Conditioner;
use stick_conditioner::store::{CalibrationStore, FileStore};

/// Jitter of the simulated converter in raw counts
const SIMULATED_NOISE: i32 = 12;

/// Number of cycles between status log messages
const LOG_INTERVAL_CYCLES: u64 = 1000;

/// Operator command read from stdin
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Calibrate,
    SetDeadzone(i32),
    Move(Axis, i32),
    Status,
}

/// Parses one stdin line; `None` for blank or unrecognised input.
fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    match words.next()? {
        "cal" | "calibrate" => Some(Command::Calibrate),
        "dz" => words.next()?.parse().ok().map(Command::SetDeadzone),
        "stick" => {
            let axis = Axis::from_short_name(words.next()?)?;
            let raw = words.next()?.parse().ok()?;
            Some(Command::Move(axis, raw))
        }
        "status" => Some(Command::Status),
        _ => None,
    }
}

/// Period of one conditioning cycle at `hz` cycles per second.
fn cycle_period(hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(hz.max(1)))
}

/// Installs the tracing subscriber, adding a rolling log file when configured.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if logging.log_dir.is_empty() {
        fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.log_dir, "stick-conditioner.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Some(guard)
}

/// Main entry point
///
/// Loads the configuration (defaults when no path is given), opens the
/// calibration store and runs the conditioning loop at `cycle_hz` until
/// Ctrl+C.
///
/// # Errors
///
/// Returns error if the configuration or calibration store cannot be read.
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("Failed to load config {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);

    info!("Stick Conditioner v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = FileStore::open(&config.calibration.store_path)
        .with_context(|| format!("Failed to open calibration store {}", config.calibration.store_path))?;

    let range = config.axis_range();
    let mut conditioner = Conditioner::load(
        range,
        store,
        config.calibration.default_inner_deadzone,
        config.calibration_settings(),
    );

    let rest = conditioner.calibration().centers;
    let adc = SimulatedAdc::new(
        [
            rest.get(Axis::LeftX),
            rest.get(Axis::LeftY),
            rest.get(Axis::RightX),
            rest.get(Axis::RightY),
        ],
        SIMULATED_NOISE,
    )
    .with_input_max(range.input_max);
    let mut sampler = Sampler::new(adc, config.sticks.sample_count);

    let mut throttle = DiagnosticThrottle::new(Duration::from_millis(config.diagnostics.interval_ms));

    let mut ticker = interval(cycle_period(config.sticks.cycle_hz));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("Conditioning at {}Hz", config.sticks.cycle_hz);
    info!("Commands: cal | dz <n> | stick <lx|ly|rx|ry> <raw> | status");
    info!("Press Ctrl+C to exit");

    let mut cycles: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let raw = sampler.sample();
                let output = conditioner.process(&raw);

                if config.diagnostics.enabled {
                    throttle.emit(Instant::now(), &raw, &output);
                }

                cycles += 1;
                if cycles % LOG_INTERVAL_CYCLES == 0 {
                    debug!("{} cycles, right stick ({}, {})", cycles, output.right.x, output.right.y);
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Some(Command::Calibrate) => {
                            let result = tokio::task::block_in_place(|| {
                                conditioner.calibrate(sampler.source_mut(), &mut StdDelay)
                            });
                            if let Err(e) = result {
                                warn!("Calibration not saved, keeping previous centers: {}", e);
                            }
                        }
                        Some(Command::SetDeadzone(value)) => {
                            if let Err(e) = conditioner.set_inner_deadzone(value) {
                                warn!("Inner deadzone not saved: {}", e);
                            }
                        }
                        Some(Command::Move(axis, raw)) => {
                            sampler.source_mut().set_position(axis, raw);
                            info!("Simulated {} moved to {}", axis.short_name(), raw);
                        }
                        Some(Command::Status) => {
                            let cal = conditioner.calibration();
                            info!(
                                "Calibration: Lx={} Ly={} Rx={} Ry={} dz={} (store {} Lx={:?})",
                                cal.center(Axis::LeftX),
                                cal.center(Axis::LeftY),
                                cal.center(Axis::RightX),
                                cal.center(Axis::RightY),
                                cal.inner_deadzone,
                                conditioner.store().path().display(),
                                conditioner.store().get(Axis::LeftX.store_key()).ok().flatten(),
                            );
                        }
                        None if line.trim().is_empty() => {}
                        None => warn!("Unknown command: {}", line.trim()),
                    },
                    Ok(None) => {
                        debug!("stdin closed, operator commands disabled");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total cycles: {}", cycles);
                break;
            }
        }
    }

    Ok(())
}
