//! therm daemon - CPU temperature watch
//!
//! Samples the CPU temperature every few seconds, appends each reading to
//! a log file and raises a desktop alert at or above the threshold.
//!
//! # Usage
//!
//! ```bash
//! # Detach and monitor with the built-in settings (5 s, 65 °C)
//! thermd
//!
//! # Stay attached to the terminal, diagnostics on stderr
//! thermd start --foreground
//!
//! # Override settings from a file
//! thermd --config /etc/therm/thermd.toml start
//!
//! # Stop the daemon / check on it
//! thermd stop
//! thermd status
//!
//! # Read the sensor once
//! thermd probe --json
//!
//! # Enable debug diagnostics
//! RUST_LOG=thermd=debug thermd start -f
//! ```
//!
//! # Signal Handling
//!
//! None. SIGTERM/SIGINT end the daemon immediately; every reading already
//! logged is on disk.

use std::path::PathBuf;
use std::process::{self, ExitCode};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use thermd::app::{self, ProbeReport};
use thermd::config::Config;
use thermd::pidfile::{is_process_running, running_daemon};

/// therm daemon - CPU temperature watch
#[derive(Parser, Debug)]
#[command(name = "thermd", version, about)]
struct Args {
    /// TOML file overriding the built-in settings
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the daemon (the default)
    Start {
        /// Stay attached to the terminal instead of detaching
        #[arg(short, long)]
        foreground: bool,
    },
    /// Stop the running daemon
    Stop,
    /// Show daemon status
    Status,
    /// Read the sensor once and print the result
    Probe {
        /// Print JSON instead of a log-style line
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(thermd::error::EXIT_CONFIG);
        }
    };

    // Default to 'start' if no subcommand given
    let command = args.command.unwrap_or(Command::Start { foreground: false });

    match command {
        Command::Start { foreground } => match app::start(config, foreground) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                // Only visible in the foreground; stderr is /dev/null once detached.
                tracing::error!(error = %e, "therm daemon failed");
                eprintln!("Error: {e}");
                ExitCode::from(e.exit_code())
            }
        },
        Command::Stop => report(stop(&config)),
        Command::Status => report(status(&config)),
        Command::Probe { json } => report(probe(&config, json)),
    }
}

fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Sends SIGTERM to the daemon process and waits for it to go away.
fn stop(config: &Config) -> Result<()> {
    let Some(pid) = running_daemon(&config.pid_file) else {
        println!("Daemon is not running.");
        return Ok(());
    };

    println!("Stopping daemon (PID {pid})...");
    let pid_t = libc::pid_t::try_from(pid).context("PID out of range")?;
    let result = unsafe { libc::kill(pid_t, libc::SIGTERM) };
    if result != 0 {
        bail!("Failed to send SIGTERM to process {pid}");
    }

    for _ in 0..50 {
        if !is_process_running(pid) {
            thermd::pidfile::remove_pid_file(&config.pid_file);
            println!("Daemon stopped.");
            return Ok(());
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    bail!("Daemon did not stop within 5 seconds")
}

fn status(config: &Config) -> Result<()> {
    match running_daemon(&config.pid_file) {
        Some(pid) => {
            println!("Daemon is running (PID {pid})");
            println!("Log: {}", config.log_path.display());
            Ok(())
        }
        None => {
            println!("Daemon is not running.");
            process::exit(1);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn probe(config: &Config, json: bool) -> Result<()> {
    let report: ProbeReport = app::probe(config).await.context("Failed to query sensor")?;

    if json {
        let rendered = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{rendered}");
    } else {
        println!("{}", report.reading);
        if report.sensed.is_degraded() {
            eprintln!("Warning: sensor reported {:?}", report.sensed);
        }
    }
    Ok(())
}
