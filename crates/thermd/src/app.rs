//! Daemon lifecycle: detach, diagnostics, log sink, monitor loop.
//!
//! Startup order matters:
//!
//! 1. Refuse to start if a live daemon owns the PID file
//! 2. Detach from the terminal (skipped with `--foreground`)
//! 3. Install the tracing subscriber (stderr is `/dev/null` once detached)
//! 4. Start a single-threaded runtime, open the readings log (exit 1 on failure)
//! 5. Write the PID file and run the monitor forever

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process;
use std::sync::Mutex;

use serde::Serialize;
use therm_core::{Reading, SensorReading};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::daemon::{detach, DetachOptions};
use crate::error::Result;
use crate::log_sink::LogSink;
use crate::monitor::Monitor;
use crate::notifier::DesktopNotifier;
use crate::pidfile::{ensure_not_running, remove_pid_file, write_pid};
use crate::sensor::{SensorCommand, TemperatureSource};

// ============================================================================
// Logging Setup
// ============================================================================

/// Where diagnostics go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// Foreground runs keep the terminal
    Stderr,
    /// Detached runs write to a file
    File(&'a Path),
}

fn default_filter() -> EnvFilter {
    let directive = |s: &str| {
        s.parse::<Directive>()
            .unwrap_or_else(|_| Directive::from(Level::INFO))
    };
    EnvFilter::from_default_env()
        .add_directive(directive("thermd=info"))
        .add_directive(directive("therm_core=info"))
}

fn open_diagnostics_file(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Installs the global tracing subscriber.
///
/// If the diagnostics file cannot be opened, tracing is switched off: there
/// is nowhere else to write once the standard streams are gone.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(target: LogTarget<'_>) -> std::result::Result<(), TryInitError> {
    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(default_filter())
            .with_writer(std::io::stderr)
            .finish()
            .try_init(),
        LogTarget::File(path) => match open_diagnostics_file(path) {
            Some(file) => tracing_subscriber::fmt()
                .with_env_filter(default_filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish()
                .try_init(),
            None => tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .finish()
                .try_init(),
        },
    }
}

// ============================================================================
// Start
// ============================================================================

/// Starts the daemon. Returns only if the monitor loop ends.
///
/// # Errors
///
/// Any error is fatal; map it to a status with
/// [`DaemonError::exit_code`](crate::error::DaemonError::exit_code).
pub fn start(config: Config, foreground: bool) -> Result<()> {
    config.validate()?;
    ensure_not_running(&config.pid_file)?;

    let installed = if foreground {
        init_tracing(LogTarget::Stderr)
    } else {
        detach(&DetachOptions::default())?;
        init_tracing(LogTarget::File(&config.diagnostics_log))
    };
    if let Err(e) = installed {
        eprintln!("Warning: diagnostics disabled: {e}");
    }

    run_daemon(config)
}

#[tokio::main(flavor = "current_thread")]
async fn run_daemon(config: Config) -> Result<()> {
    let sink = LogSink::open(&config.log_path).await?;

    write_pid(&config.pid_file)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        "therm daemon starting"
    );

    let monitor = Monitor::new(
        SensorCommand::from_config(&config.sensor, config.sensor.timeout()?),
        DesktopNotifier::from_config(&config.notifier, config.notifier.timeout()?),
        sink,
        config.threshold()?,
        config.interval()?,
    );

    // Never cancelled: the daemon runs until it is killed.
    let cycles = monitor.run(CancellationToken::new()).await;

    remove_pid_file(&config.pid_file);
    info!(cycles, "therm daemon stopped");
    Ok(())
}

// ============================================================================
// Probe
// ============================================================================

/// Result of a one-off sensor query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeReport {
    pub sensed: SensorReading,
    pub reading: Reading,
}

/// Queries the sensor once, without touching the log or notifier.
pub async fn probe(config: &Config) -> Result<ProbeReport> {
    let source = SensorCommand::from_config(&config.sensor, config.sensor.timeout()?);
    let sensed = source.read_temperature().await;
    Ok(ProbeReport {
        sensed,
        reading: Reading::capture(sensed),
    })
}
