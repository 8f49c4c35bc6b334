//! Binary-level tests for `thermd`.
//!
//! These run the real executable: startup failures and their exit codes,
//! the one-off probe, and a fully detached daemon inspected through
//! `/proc` before being stopped.
//!
//! Tests CAN use `.unwrap()` and `.expect()` - this is allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, Instant};

use tempfile::TempDir;

// ============================================================================
// Constants
// ============================================================================

const STARTUP_TIMEOUT: Duration = Duration::from_secs(15);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Test Helpers
// ============================================================================

fn toml_str(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

struct Fixture {
    dir: TempDir,
    config_path: PathBuf,
}

impl Fixture {
    /// Writes a config whose sensor prints `sensor_line` and whose
    /// notifier appends each alert body to `alerts.txt`.
    fn new(sensor_line: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let fixture = Self {
            config_path: dir.path().join("thermd.toml"),
            dir,
        };
        fixture.write_config(&fixture.dir.path().join("cpu_temp_log.txt"), sensor_line);
        fixture
    }

    fn write_config(&self, log_path: &Path, sensor_line: &str) {
        let sensor_script = format!("echo '{sensor_line}'");
        let notify_script = format!("printf '%s\\n' \"$1\" >> '{}'", self.alerts_path().display());

        let config = format!(
            "interval_secs = 0.1\n\
             threshold_celsius = 65.0\n\
             log_path = {log}\n\
             pid_file = {pid}\n\
             diagnostics_log = {diag}\n\
             \n\
             [sensor]\n\
             program = \"sh\"\n\
             args = [\"-c\", {sensor}]\n\
             \n\
             [notifier]\n\
             program = \"sh\"\n\
             args = [\"-c\", {notify}]\n",
            log = toml_str(&log_path.display().to_string()),
            pid = toml_str(&self.pid_path().display().to_string()),
            diag = toml_str(&self.dir.path().join("thermd.log").display().to_string()),
            sensor = toml_str(&sensor_script),
            notify = toml_str(&notify_script),
        );
        fs::write(&self.config_path, config).expect("write config");
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("cpu_temp_log.txt")
    }

    fn pid_path(&self) -> PathBuf {
        self.dir.path().join("thermd.pid")
    }

    fn alerts_path(&self) -> PathBuf {
        self.dir.path().join("alerts.txt")
    }

    fn thermd(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_thermd"))
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .output()
            .expect("run thermd")
    }
}

fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < STARTUP_TIMEOUT {
        if condition() {
            return;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    panic!("timed out waiting for {what}");
}

/// Kills a detached daemon if a test bails out early.
struct DaemonGuard(i32);

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        unsafe {
            libc::kill(self.0, libc::SIGKILL);
        }
    }
}

// ============================================================================
// Startup Failures
// ============================================================================

#[test]
fn test_unwritable_log_exits_with_status_1() {
    let fixture = Fixture::new("Tctl: +55.0°C");
    let blocker = fixture.dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    fixture.write_config(&blocker.join("cpu_temp_log.txt"), "Tctl: +55.0°C");

    let output = fixture.thermd(&["start", "--foreground"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to open log file"));
    assert!(!fixture.pid_path().exists(), "must exit before running");
}

#[test]
fn test_invalid_config_exits_with_status_2() {
    let fixture = Fixture::new("Tctl: +55.0°C");
    fs::write(&fixture.config_path, "interval_secs = -1\n").unwrap();

    let output = fixture.thermd(&["start", "--foreground"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("interval_secs"));
}

#[test]
fn test_status_without_daemon_fails() {
    let fixture = Fixture::new("Tctl: +55.0°C");
    let output = fixture.thermd(&["status"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("not running"));
}

// ============================================================================
// Probe
// ============================================================================

#[test]
fn test_probe_prints_reading() {
    let fixture = Fixture::new("Tctl: +70.2°C");

    let output = fixture.thermd(&["probe"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Temp: 70.20°C");
    assert!(!fixture.log_path().exists(), "probe must not touch the log");
}

#[test]
fn test_probe_json_marks_missing_marker() {
    let fixture = Fixture::new("edge: +48.0°C");

    let output = fixture.thermd(&["probe", "--json"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["sensed"]["status"], "not_found");
    assert_eq!(report["reading"]["celsius"], 0.0);
}

// ============================================================================
// Detached Daemon
// ============================================================================

#[cfg(target_os = "linux")]
#[test]
fn test_detached_daemon_monitors_until_stopped() {
    let fixture = Fixture::new("Tctl: +70.2°C");

    // No subcommand: detach and monitor. The launching process exits 0.
    let output = fixture.thermd(&[]);
    assert!(output.status.success(), "launcher exit: {:?}", output.status);
    assert!(output.stdout.is_empty());

    wait_for("pid file", || {
        fs::read_to_string(fixture.pid_path())
            .map(|s| s.trim().parse::<i32>().is_ok())
            .unwrap_or(false)
    });
    let pid: i32 = fs::read_to_string(fixture.pid_path())
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    let _guard = DaemonGuard(pid);

    wait_for("two log records", || {
        fs::read_to_string(fixture.log_path())
            .map(|log| log.matches("] Temp: 70.20°C\n").count() >= 2)
            .unwrap_or(false)
    });

    // Detached: no terminal, not a session leader, root cwd, cleared umask,
    // standard streams on /dev/null.
    let proc_dir = PathBuf::from(format!("/proc/{pid}"));
    let stat = fs::read_to_string(proc_dir.join("stat")).unwrap();
    let after_comm = &stat[stat.rfind(')').unwrap() + 1..];
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    let session: i32 = fields[3].parse().unwrap();
    let tty_nr: i32 = fields[4].parse().unwrap();
    assert_eq!(tty_nr, 0, "daemon must have no controlling terminal");
    assert_ne!(session, pid, "daemon must not be a session leader");

    assert_eq!(fs::read_link(proc_dir.join("cwd")).unwrap(), PathBuf::from("/"));
    for fd in 0..3 {
        let target = fs::read_link(proc_dir.join("fd").join(fd.to_string())).unwrap();
        assert_eq!(target, PathBuf::from("/dev/null"), "fd {fd}");
    }

    let status = fs::read_to_string(proc_dir.join("status")).unwrap();
    if let Some(umask) = status.lines().find(|l| l.starts_with("Umask:")) {
        assert_eq!(umask.split_whitespace().nth(1), Some("0000"));
    }

    wait_for("an alert", || {
        fs::read_to_string(fixture.alerts_path())
            .map(|a| a.contains("Temp: 70.2°C exceeds safe limit!"))
            .unwrap_or(false)
    });

    let status_output = fixture.thermd(&["status"]);
    assert!(status_output.status.success());
    assert!(String::from_utf8_lossy(&status_output.stdout).contains(&pid.to_string()));

    // A second start refuses to run alongside the first.
    let second = fixture.thermd(&["start", "--foreground"]);
    assert_eq!(second.status.code(), Some(1));

    let stop_output = fixture.thermd(&["stop"]);
    assert!(
        stop_output.status.success(),
        "stop failed: {}",
        String::from_utf8_lossy(&stop_output.stderr)
    );
    assert!(String::from_utf8_lossy(&stop_output.stdout).contains("Daemon stopped."));
}
