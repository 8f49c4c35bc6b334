//! Sensor output parsing.
//!
//! The sensor collaborator prints line-oriented text such as:
//!
//! ```text
//! k10temp-pci-00c3
//! Adapter: PCI adapter
//! Tctl:         +55.0°C
//! ```
//!
//! Only the line starting with the marker label is of interest. Everything
//! here is pure; spawning the command lives in the daemon crate.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DomainError, DomainResult};

/// Default marker label (AMD die/control temperature).
pub const DEFAULT_SENSOR_LABEL: &str = "Tctl";

/// Unit suffix that must follow the value.
pub const CELSIUS_SUFFIX: &str = "°C";

/// Value reported when the sensor command could not be run.
pub const UNAVAILABLE_SENTINEL: f64 = -1.0;

/// Value reported when the command ran but no marker line parsed.
pub const NOT_FOUND_SENTINEL: f64 = 0.0;

/// Outcome of a single sensor query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "celsius", rename_all = "snake_case")]
pub enum SensorReading {
    /// Marker line found and parsed
    Celsius(f64),
    /// Command ran, but no marker line could be parsed
    NotFound,
    /// Command could not be started or did not finish in time
    Unavailable,
}

impl SensorReading {
    /// Collapses the outcome to the value written to the log.
    ///
    /// `NotFound` is `0.0` and `Unavailable` is `-1.0`. A genuine `0.0`
    /// reading is indistinguishable from `NotFound` at this level.
    pub fn celsius(self) -> f64 {
        match self {
            Self::Celsius(value) => value,
            Self::NotFound => NOT_FOUND_SENTINEL,
            Self::Unavailable => UNAVAILABLE_SENTINEL,
        }
    }

    /// Returns true for the sentinel outcomes.
    pub fn is_degraded(self) -> bool {
        !matches!(self, Self::Celsius(_))
    }
}

impl From<Option<f64>> for SensorReading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::NotFound, Self::Celsius)
    }
}

/// Returns true if `line` starts with `<label>:`, ignoring leading blanks.
pub fn is_marker_line(line: &str, label: &str) -> bool {
    line.trim_start()
        .strip_prefix(label)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Parses `<label>: +<decimal>°C` and returns the signed value.
///
/// Any amount of whitespace may separate the colon from the value; the
/// sign is optional. Text after the unit suffix (e.g. `(high = +70.0°C)`)
/// is ignored.
pub fn parse_sensor_line(line: &str, label: &str) -> DomainResult<f64> {
    let parse_error = |reason: &str| DomainError::ParseError {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let rest = line
        .trim_start()
        .strip_prefix(label)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| parse_error("missing marker label"))?
        .trim_start();

    let (negative, rest) = match rest.strip_prefix('-') {
        Some(unsigned) => (true, unsigned),
        None => (false, rest.strip_prefix('+').unwrap_or(rest)),
    };

    let digits_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let (digits, suffix) = rest.split_at(digits_len);

    if digits.is_empty() {
        return Err(parse_error("missing numeric value"));
    }
    if !suffix.starts_with(CELSIUS_SUFFIX) {
        return Err(parse_error("missing °C unit"));
    }

    let value: f64 = digits
        .parse()
        .map_err(|e: std::num::ParseFloatError| parse_error(&e.to_string()))?;

    Ok(if negative { -value } else { value })
}

/// Returns the value of `line` if it is a parsable marker line.
///
/// Other lines yield `None`. Marker lines that fail to parse are skipped,
/// not fatal, so scanning can go on with later lines.
pub fn marker_value(line: &str, label: &str) -> Option<f64> {
    if !is_marker_line(line, label) {
        return None;
    }
    match parse_sensor_line(line, label) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!(error = %e, "Skipping unparsable marker line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_line() {
        assert_eq!(parse_sensor_line("Tctl: +55.0°C", "Tctl").unwrap(), 55.0);
        assert_eq!(parse_sensor_line("Tctl: +70.2°C", "Tctl").unwrap(), 70.2);
    }

    #[test]
    fn test_parse_padded_line_with_trailing_text() {
        let value = parse_sensor_line("Tctl:         +61.25°C  (high = +95.0°C)", "Tctl").unwrap();
        assert_eq!(value, 61.25);
    }

    #[test]
    fn test_parse_signed_values() {
        assert_eq!(parse_sensor_line("Tctl: -5.5°C", "Tctl").unwrap(), -5.5);
        assert_eq!(parse_sensor_line("Tctl: 42.0°C", "Tctl").unwrap(), 42.0);
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        assert!(parse_sensor_line("Tctl: N/A", "Tctl").is_err());
        assert!(parse_sensor_line("Tctl: +°C", "Tctl").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_unit() {
        assert!(parse_sensor_line("Tctl: +55.0", "Tctl").is_err());
        assert!(parse_sensor_line("Tctl: +55.0°F", "Tctl").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_number() {
        assert!(parse_sensor_line("Tctl: +5.5.5°C", "Tctl").is_err());
    }

    #[test]
    fn test_parse_rejects_other_label() {
        assert!(parse_sensor_line("Tdie: +55.0°C", "Tctl").is_err());
    }

    #[test]
    fn test_is_marker_line() {
        assert!(is_marker_line("Tctl:         +55.0°C", "Tctl"));
        assert!(is_marker_line("  Tctl: +55.0°C", "Tctl"));
        assert!(!is_marker_line("Tctlx: +55.0°C", "Tctl"));
        assert!(!is_marker_line("edge: +48.0°C", "Tctl"));
    }

    #[test]
    fn test_marker_value() {
        assert_eq!(marker_value("Tctl:         +55.0°C", "Tctl"), Some(55.0));
        let coretemp = "Package id 0:  +45.0°C  (high = +80.0°C)";
        assert_eq!(marker_value(coretemp, "Package id 0"), Some(45.0));
    }

    #[test]
    fn test_marker_value_ignores_other_and_bad_lines() {
        assert_eq!(marker_value("edge:         +48.0°C", "Tctl"), None);
        assert_eq!(marker_value("Adapter: PCI adapter", "Tctl"), None);
        assert_eq!(marker_value("Tctl: N/A", "Tctl"), None);
        assert_eq!(marker_value("Tctl: +55.0\u{FFFD}C", "Tctl"), None);
    }

    #[test]
    fn test_sensor_reading_sentinels() {
        assert_eq!(SensorReading::Celsius(70.2).celsius(), 70.2);
        assert_eq!(SensorReading::NotFound.celsius(), 0.0);
        assert_eq!(SensorReading::Unavailable.celsius(), -1.0);
        assert!(!SensorReading::Celsius(0.0).is_degraded());
        assert!(SensorReading::NotFound.is_degraded());
        assert!(SensorReading::Unavailable.is_degraded());
    }

    #[test]
    fn test_sensor_reading_from_option() {
        assert_eq!(SensorReading::from(Some(55.0)), SensorReading::Celsius(55.0));
        assert_eq!(SensorReading::from(None), SensorReading::NotFound);
    }

    #[test]
    fn test_sensor_reading_json_shape() {
        let json = serde_json::to_string(&SensorReading::Celsius(55.0)).unwrap();
        assert_eq!(json, r#"{"status":"celsius","celsius":55.0}"#);
        let json = serde_json::to_string(&SensorReading::Unavailable).unwrap();
        assert_eq!(json, r#"{"status":"unavailable"}"#);
    }
}
