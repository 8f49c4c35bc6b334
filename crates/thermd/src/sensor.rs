//! Temperature reader backed by an external sensor command.
//!
//! Runs the sensor-reporting tool (`sensors` from lm-sensors by default),
//! streams its stdout and stops at the first parsable marker line.
//!
//! # Failure Semantics
//!
//! Nothing here returns an error. A command that cannot be started or
//! does not finish within the timeout reads as [`SensorReading::Unavailable`];
//! output without a usable marker line reads as [`SensorReading::NotFound`].
//! The child is reaped on every path so no zombie survives a cycle.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use therm_core::{marker_value, SensorReading};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::config::SensorConfig;

/// How long to wait for the child to exit after its output was consumed.
pub const REAP_GRACE: Duration = Duration::from_millis(500);

// ============================================================================
// Trait
// ============================================================================

/// Anything that can produce one temperature reading per call.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    async fn read_temperature(&self) -> SensorReading;
}

// ============================================================================
// Sensor Command
// ============================================================================

/// Sensor backend that shells out to a text-reporting command.
#[derive(Debug, Clone)]
pub struct SensorCommand {
    program: String,
    args: Vec<String>,
    label: String,
    timeout: Duration,
}

impl SensorCommand {
    /// Creates a reader for `program args...`, looking for `label`.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        label: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            label: label.into(),
            timeout,
        }
    }

    /// Builds a reader from validated configuration.
    pub fn from_config(config: &SensorConfig, timeout: Duration) -> Self {
        Self::new(
            config.program.clone(),
            config.args.iter().cloned(),
            config.label.clone(),
            timeout,
        )
    }

    fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

#[async_trait]
impl TemperatureSource for SensorCommand {
    async fn read_temperature(&self) -> SensorReading {
        let mut child = match self.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %self.program, error = %e, "Failed to start sensor command");
                return SensorReading::Unavailable;
            }
        };

        let Some(stdout) = child.stdout.take() else {
            warn!(program = %self.program, "Sensor command has no stdout pipe");
            reap(&mut child).await;
            return SensorReading::Unavailable;
        };

        let reading = match timeout(self.timeout, scan_stream(stdout, &self.label)).await {
            Ok(Ok(value)) => SensorReading::from(value),
            Ok(Err(e)) => {
                warn!(program = %self.program, error = %e, "Failed to read sensor output");
                SensorReading::NotFound
            }
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Sensor command timed out"
                );
                SensorReading::Unavailable
            }
        };

        reap(&mut child).await;

        if reading == SensorReading::NotFound {
            debug!(label = %self.label, "No parsable marker line in sensor output");
        }
        reading
    }
}

/// Reads lines until the first parsable marker line.
///
/// Lines are split on raw bytes and decoded lossily, so output that is not
/// valid UTF-8 only spoils the lines it appears on. Returns `Ok(None)` at
/// end of stream. The reader is dropped on return, closing our end of the
/// pipe.
async fn scan_stream<R>(stream: R, label: &str) -> std::io::Result<Option<f64>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).split(b'\n');
    while let Some(raw) = lines.next_segment().await? {
        let line = String::from_utf8_lossy(&raw);
        if let Some(value) = marker_value(line.trim_end_matches('\r'), label) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Waits briefly for the child, killing it if it lingers.
async fn reap(child: &mut Child) {
    match timeout(REAP_GRACE, child.wait()).await {
        Ok(Ok(status)) => trace!(%status, "Sensor command exited"),
        Ok(Err(e)) => debug!(error = %e, "Failed to wait for sensor command"),
        Err(_) => {
            debug!("Sensor command still running after output was read, killing it");
            if let Err(e) = child.kill().await {
                debug!(error = %e, "Failed to kill sensor command");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
