//! CPU load generator for exercising the monitor.
//!
//! Keeps one core busy with dependent floating-point multiplications so
//! the temperature climbs past the alert threshold. Run it next to the
//! daemon and watch the log.

use std::hint::black_box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

/// Multiplications per batch.
pub const BATCH_ITERATIONS: u32 = 1_000_000;

/// Growth factor applied on every multiplication.
pub const GROWTH_FACTOR: f64 = 1.000_001;

/// Runs one batch and returns the accumulated product.
///
/// Each batch starts again from `1.0`, so the result stays near
/// `GROWTH_FACTOR.powi(BATCH_ITERATIONS)` (about `e`) and never overflows.
pub fn burn_batch() -> f64 {
    let mut x = black_box(1.0_f64);
    for _ in 0..BATCH_ITERATIONS {
        x = black_box(x * GROWTH_FACTOR);
    }
    x
}

/// Burns CPU until `stop` is set or `limit` elapses, returning the batch count.
///
/// With no limit and a flag that is never set, this runs until the
/// process is killed.
pub fn run(limit: Option<Duration>, stop: &AtomicBool) -> u64 {
    let started = Instant::now();
    let mut batches: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
        black_box(burn_batch());
        batches += 1;
    }

    debug!(batches, elapsed_ms = started.elapsed().as_millis() as u64, "Stress run finished");
    batches
}
