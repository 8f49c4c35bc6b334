//! therm core - shared types for CPU temperature monitoring
//!
//! This crate provides the domain types used by the daemon (`thermd`):
//! readings, the alert threshold, and parsing of sensor command output.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod error;
pub mod reading;
pub mod sensor;
pub mod threshold;

// Re-exports for convenience
pub use error::{DomainError, DomainResult};
pub use reading::{Reading, CTIME_FORMAT};
pub use sensor::{
    is_marker_line, marker_value, parse_sensor_line, SensorReading, DEFAULT_SENSOR_LABEL,
    NOT_FOUND_SENTINEL, UNAVAILABLE_SENTINEL,
};
pub use threshold::Threshold;
