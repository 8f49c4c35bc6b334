//! A single temperature reading and its log record format.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::sensor::SensorReading;

/// `ctime(3)` layout, e.g. `Wed Jun 30 21:49:08 1993`.
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// One sample of CPU temperature.
///
/// Created once per monitoring cycle, written to the log and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Temperature in Celsius (sentinel values included)
    pub celsius: f64,

    /// Local wall-clock time the reading was taken
    pub captured_at: DateTime<Local>,
}

impl Reading {
    /// Creates a reading captured at the given time.
    pub fn new(celsius: f64, captured_at: DateTime<Local>) -> Self {
        Self {
            celsius,
            captured_at,
        }
    }

    /// Creates a reading from a sensor outcome, stamped with the current time.
    pub fn capture(sensed: SensorReading) -> Self {
        Self::new(sensed.celsius(), Local::now())
    }

    /// Formats the append-only log record, including the trailing newline.
    ///
    /// The timestamp keeps the newline `ctime(3)` emits, so each record
    /// spans two lines:
    ///
    /// ```text
    /// [Tue Jun  3 21:49:08 2025
    /// ] Temp: 55.00°C
    /// ```
    pub fn log_record(&self) -> String {
        format!(
            "[{}\n] Temp: {:.2}°C\n",
            self.captured_at.format(CTIME_FORMAT),
            self.celsius
        )
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Temp: {:.2}°C", self.celsius)
    }
}
