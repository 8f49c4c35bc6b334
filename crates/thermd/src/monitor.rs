//! Temperature monitor loop.
//!
//! Each cycle:
//! 1. Reads the temperature from the [`TemperatureSource`]
//! 2. Appends a timestamped record to the [`LogSink`] and syncs it
//! 3. Calls the [`AlertSink`] if the reading is at or above the threshold
//!
//! Cycles are separated by a fixed interval. The loop has no exit path of
//! its own; it stops only when the [`CancellationToken`] is cancelled,
//! which the daemon never does.
//!
//! # Panic-Free Guarantees
//!
//! All code follows the project panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Per-cycle failures are logged and the loop carries on

use std::time::Duration;

use therm_core::{Reading, SensorReading, Threshold};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::log_sink::LogSink;
use crate::notifier::AlertSink;
use crate::sensor::TemperatureSource;

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    /// Raw sensor outcome
    pub sensed: SensorReading,

    /// Reading as written to the log
    pub reading: Reading,

    /// Whether the record reached durable storage
    pub logged: bool,

    /// Whether the notifier was called
    pub alerted: bool,
}

/// Orchestrates sensing, logging and alerting.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    sink: LogSink,
    threshold: Threshold,
    interval: Duration,
}

impl<S, N> Monitor<S, N>
where
    S: TemperatureSource,
    N: AlertSink,
{
    /// Creates a monitor over an already opened log sink.
    pub fn new(source: S, notifier: N, sink: LogSink, threshold: Threshold, interval: Duration) -> Self {
        Self {
            source,
            notifier,
            sink,
            threshold,
            interval,
        }
    }

    /// Returns the alert threshold.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Returns the sleep between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs a single read → log → maybe-notify cycle.
    pub async fn cycle(&mut self) -> CycleOutcome {
        let sensed = self.source.read_temperature().await;
        match sensed {
            SensorReading::Celsius(celsius) => debug!(celsius, "Temperature read"),
            SensorReading::NotFound => warn!("No temperature marker in sensor output, logging 0.0"),
            SensorReading::Unavailable => warn!("Sensor command unavailable, logging -1.0"),
        }

        let reading = Reading::capture(sensed);

        let logged = match self.sink.append(&reading).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    path = %self.sink.path().display(),
                    error = %e,
                    "Failed to write reading to log"
                );
                false
            }
        };

        let alerted = self.threshold.is_reached_by(reading.celsius);
        if alerted {
            self.notifier.notify(reading.celsius).await;
        }

        CycleOutcome {
            sensed,
            reading,
            logged,
            alerted,
        }
    }

    /// Runs cycles until `cancel` fires and returns how many completed.
    ///
    /// Cancellation is checked before each cycle and raced against the
    /// interval sleep; a cycle in progress always finishes.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        info!(
            threshold = %self.threshold,
            interval_secs = self.interval.as_secs_f64(),
            log = %self.sink.path().display(),
            "Temperature monitor started"
        );

        let mut cycles: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let outcome = self.cycle().await;
            cycles += 1;
            debug!(
                cycle = cycles,
                celsius = outcome.reading.celsius,
                alerted = outcome.alerted,
                "Cycle complete"
            );

            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                _ = sleep(self.interval) => {}
            }
        }

        info!(cycles, "Temperature monitor stopped");
        cycles
    }
}

// ============================================================================
// Tests
// ============================================================================
