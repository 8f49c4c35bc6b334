//! Alert threshold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Alert threshold in degrees Celsius.
///
/// A reading at or above the threshold triggers an alert. There is no
/// hysteresis: every reading is judged on its own.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Creates a threshold, rejecting NaN and infinities.
    pub fn new(celsius: f64) -> DomainResult<Self> {
        if celsius.is_finite() {
            Ok(Self(celsius))
        } else {
            Err(DomainError::InvalidThreshold { value: celsius })
        }
    }

    /// Returns the threshold value in Celsius.
    pub fn celsius(self) -> f64 {
        self.0
    }

    /// Returns true when `celsius` should raise an alert.
    pub fn is_reached_by(self, celsius: f64) -> bool {
        celsius >= self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}
