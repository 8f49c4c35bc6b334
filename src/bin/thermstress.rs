//! thermstress - keeps one CPU core busy
//!
//! Companion load generator for checking the daemon end to end: run it,
//! watch the readings log climb, and expect an alert at the threshold.
//!
//! ```bash
//! thermstress              # until Ctrl+C
//! thermstress --seconds 60
//! ```

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use thermd::app::{init_tracing, LogTarget};
use thermd::stress;

/// Burn CPU to raise its temperature
#[derive(Parser, Debug)]
#[command(name = "thermstress", version, about)]
struct Args {
    /// Stop after this many seconds (default: run until killed)
    #[arg(short, long, value_name = "SECS")]
    seconds: Option<u64>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_tracing(LogTarget::Stderr) {
        eprintln!("Warning: diagnostics disabled: {e}");
    }

    let limit = args.seconds.map(Duration::from_secs);
    info!(seconds = ?args.seconds, "Starting CPU stress");

    // Never set: termination is by signal or the time limit.
    let stop = AtomicBool::new(false);
    let batches = stress::run(limit, &stop);

    info!(batches, "CPU stress finished");
}
