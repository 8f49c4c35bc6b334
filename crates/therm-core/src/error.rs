//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// Errors that can occur in domain operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Threshold is NaN or infinite
    #[error("Invalid threshold: {value} (expected a finite Celsius value)")]
    InvalidThreshold { value: f64 },

    /// Sensor line could not be parsed
    #[error("Failed to parse sensor line {line:?}: {reason}")]
    ParseError { line: String, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
