//! Error types for the therm daemon.
//!
//! Only startup can fail. Once the monitor loop runs, sensor and
//! notification problems are per-cycle and never surface as errors.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.
//! No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, or `todo!()`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit status when the log file cannot be opened (and other startup I/O).
pub const EXIT_STARTUP: u8 = 1;

/// Exit status for configuration errors.
pub const EXIT_CONFIG: u8 = 2;

/// Exit status when detaching from the terminal fails.
pub const EXIT_DETACH: u8 = 3;

// ============================================================================
// Daemon Error Type
// ============================================================================

/// Fatal daemon startup errors.
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Configuration file could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Another daemon instance owns the pid file.
    #[error("Daemon is already running (PID {pid})")]
    AlreadyRunning { pid: u32 },

    /// A fork or session step of the double-fork failed.
    #[error("Failed to detach from terminal: {0}")]
    Detach(String),

    /// The readings log could not be opened for appending.
    #[error("Failed to open log file {path:?}: {source}")]
    LogOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pid file could not be written.
    #[error("Failed to write PID file {path:?}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DaemonError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Detach(_) => EXIT_DETACH,
            Self::AlreadyRunning { .. } | Self::LogOpen { .. } | Self::PidFile { .. } => {
                EXIT_STARTUP
            }
        }
    }
}

/// Convenience Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;

// ============================================================================
// Tests
// ============================================================================
