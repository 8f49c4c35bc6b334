//! Desktop alerts through an external notification command.
//!
//! Notification is best-effort: a missing `notify-send`, the lack of a
//! graphical session, a non-zero exit or a hang are logged and dropped.
//! The monitor loop never sees a failure from here.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::NotifierConfig;

/// Formats the alert body for a temperature.
pub fn alert_body(celsius: f64) -> String {
    format!("Temp: {celsius:.1}°C exceeds safe limit!")
}

// ============================================================================
// Trait
// ============================================================================

/// Receiver of over-threshold alerts.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, celsius: f64);
}

// ============================================================================
// Desktop Notifier
// ============================================================================

/// Runs `<program> [args...] <title> <body>` for each alert.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: String,
    args: Vec<String>,
    title: String,
    timeout: Duration,
}

impl DesktopNotifier {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        title: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            title: title.into(),
            timeout,
        }
    }

    pub fn from_config(config: &NotifierConfig, timeout: Duration) -> Self {
        Self::new(
            config.program.clone(),
            config.args.iter().cloned(),
            config.title.clone(),
            timeout,
        )
    }

    fn command(&self, body: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&self.title)
            .arg(body)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl AlertSink for DesktopNotifier {
    async fn notify(&self, celsius: f64) {
        let body = alert_body(celsius);
        info!(celsius, "Temperature at or above threshold, sending alert");

        match timeout(self.timeout, self.command(&body).status()).await {
            Ok(Ok(status)) if status.success() => {
                debug!(program = %self.program, "Alert delivered");
            }
            Ok(Ok(status)) => {
                warn!(program = %self.program, %status, "Notification command failed");
            }
            Ok(Err(e)) => {
                warn!(program = %self.program, error = %e, "Failed to start notification command");
            }
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Notification command timed out"
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_alert_body_one_decimal() {
        assert_eq!(alert_body(70.2), "Temp: 70.2°C exceeds safe limit!");
        assert_eq!(alert_body(65.0), "Temp: 65.0°C exceeds safe limit!");
        assert_eq!(alert_body(88.26), "Temp: 88.3°C exceeds safe limit!");
    }

    #[tokio::test]
    async fn test_passes_title_and_body_as_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("alert.txt");
        let script = format!("printf '%s|%s' \"$0\" \"$1\" > '{}'", out.display());

        let notifier = DesktopNotifier::new("sh", ["-c".to_string(), script], "⚠️ CPU ALERT", TIMEOUT);
        notifier.notify(70.2).await;

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "⚠️ CPU ALERT|Temp: 70.2°C exceeds safe limit!");
    }

    #[tokio::test]
    async fn test_missing_program_is_swallowed() {
        let notifier = DesktopNotifier::new(
            "/nonexistent/notify-send",
            Vec::<String>::new(),
            "title",
            TIMEOUT,
        );
        notifier.notify(99.0).await;
    }

    #[tokio::test]
    async fn test_failing_program_is_swallowed() {
        let notifier = DesktopNotifier::new("false", Vec::<String>::new(), "title", TIMEOUT);
        notifier.notify(99.0).await;
    }

    #[tokio::test]
    async fn test_hung_program_times_out() {
        let notifier = DesktopNotifier::new(
            "sh",
            ["-c", "sleep 30"],
            "title",
            Duration::from_millis(200),
        );
        let started = std::time::Instant::now();
        notifier.notify(99.0).await;
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_from_config_defaults() {
        let notifier = DesktopNotifier::from_config(&NotifierConfig::default(), TIMEOUT);
        assert_eq!(notifier.program, "notify-send");
        assert_eq!(notifier.title, "⚠️ CPU ALERT");
    }
}
