//! Daemon configuration.
//!
//! The built-in constants reproduce the stock behaviour: sample every
//! 5 seconds, alert at 65 °C, read `Tctl` from `sensors`, alert through
//! `notify-send`. An optional TOML file can override any field:
//!
//! ```toml
//! interval_secs = 5
//! threshold_celsius = 65.0
//! log_path = "/var/log/therm/cpu_temp_log.txt"
//!
//! [sensor]
//! program = "sensors"
//! label = "Tctl"
//!
//! [notifier]
//! program = "notify-send"
//! ```
//!
//! The file is read once at startup. There is no reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use therm_core::{Threshold, DEFAULT_SENSOR_LABEL};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Seconds between samples.
pub const DEFAULT_INTERVAL_SECS: f64 = 5.0;

/// Alert threshold in Celsius.
pub const DEFAULT_THRESHOLD_CELSIUS: f64 = 65.0;

/// Sensor-reporting command.
pub const DEFAULT_SENSOR_PROGRAM: &str = "sensors";

/// Desktop notification command.
pub const DEFAULT_NOTIFY_PROGRAM: &str = "notify-send";

/// Notification title.
pub const DEFAULT_ALERT_TITLE: &str = "⚠️ CPU ALERT";

/// Upper bound on waiting for either external command.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: f64 = 10.0;

/// File names under the state directory.
pub const LOG_FILE_NAME: &str = "cpu_temp_log.txt";
pub const PID_FILE_NAME: &str = "thermd.pid";
pub const DIAGNOSTICS_FILE_NAME: &str = "thermd.log";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A field holds an unusable value
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

// ============================================================================
// Config
// ============================================================================

/// Returns the directory holding the log, pid and diagnostics files.
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("therm")
}

/// Complete daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Seconds to sleep between cycles
    pub interval_secs: f64,

    /// Readings at or above this value raise an alert
    pub threshold_celsius: f64,

    /// Append-only readings log
    pub log_path: PathBuf,

    /// PID file of the running daemon
    pub pid_file: PathBuf,

    /// Diagnostics written by `tracing` while detached
    pub diagnostics_log: PathBuf,

    pub sensor: SensorConfig,
    pub notifier: NotifierConfig,
}

/// Sensor command settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Marker label of the line holding the temperature
    pub label: String,
    pub timeout_secs: f64,
}

/// Notification command settings.
///
/// The command runs as `<program> [args...] <title> <body>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierConfig {
    pub program: String,
    pub args: Vec<String>,
    pub title: String,
    pub timeout_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        let dir = state_dir();
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            threshold_celsius: DEFAULT_THRESHOLD_CELSIUS,
            log_path: dir.join(LOG_FILE_NAME),
            pid_file: dir.join(PID_FILE_NAME),
            diagnostics_log: dir.join(DIAGNOSTICS_FILE_NAME),
            sensor: SensorConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_SENSOR_PROGRAM.to_string(),
            args: Vec::new(),
            label: DEFAULT_SENSOR_LABEL.to_string(),
            timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_NOTIFY_PROGRAM.to_string(),
            args: Vec::new(),
            title: DEFAULT_ALERT_TITLE.to_string(),
            timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads and validates a config file.
    ///
    /// Relative paths inside the file are resolved against the current
    /// working directory, which the daemon leaves once it detaches.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        config.absolutize(&cwd);
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if given, otherwise returns validated defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Rewrites relative paths as `base.join(path)`.
    pub fn absolutize(&mut self, base: &Path) {
        for path in [&mut self.log_path, &mut self.pid_file, &mut self.diagnostics_log] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Checks every field that could otherwise fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interval()?;
        self.threshold()?;
        self.sensor.timeout()?;
        self.notifier.timeout()?;
        require_non_empty("sensor.program", &self.sensor.program)?;
        require_non_empty("sensor.label", &self.sensor.label)?;
        require_non_empty("notifier.program", &self.notifier.program)?;
        Ok(())
    }

    /// Sleep between cycles.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        positive_duration("interval_secs", self.interval_secs)
    }

    /// Alert threshold.
    pub fn threshold(&self) -> Result<Threshold, ConfigError> {
        Threshold::new(self.threshold_celsius).map_err(|e| ConfigError::Invalid {
            field: "threshold_celsius".to_string(),
            reason: e.to_string(),
        })
    }
}

impl SensorConfig {
    /// Bounded wait for the sensor command.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        positive_duration("sensor.timeout_secs", self.timeout_secs)
    }
}

impl NotifierConfig {
    /// Bounded wait for the notification command.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        positive_duration("notifier.timeout_secs", self.timeout_secs)
    }
}

fn positive_duration(field: &str, secs: f64) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        field: field.to_string(),
        reason,
    };

    if secs.is_nan() || secs <= 0.0 {
        return Err(invalid(format!("{secs} is not a positive number of seconds")));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| invalid(e.to_string()))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
