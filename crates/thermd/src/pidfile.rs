//! PID file handling for the `start`, `stop` and `status` commands.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use tracing::debug;

use crate::error::{DaemonError, Result};

/// Reads the PID from the PID file, if it exists.
pub fn read_pid(path: &Path) -> Option<u32> {
    let mut file = File::open(path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

/// Writes the current PID to the PID file.
pub fn write_pid(path: &Path) -> Result<()> {
    let pid_error = |source| DaemonError::PidFile {
        path: PathBuf::from(path),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(pid_error)?;
    }
    let mut file = File::create(path).map_err(pid_error)?;
    write!(file, "{}", process::id()).map_err(pid_error)?;
    Ok(())
}

/// Removes the PID file.
pub fn remove_pid_file(path: &Path) {
    let _ = fs::remove_file(path);
}

/// Checks if a process with the given PID is running.
///
/// A zombie counts as gone: it has exited and only waits to be reaped.
pub fn is_process_running(pid: u32) -> bool {
    // /proc is Linux-specific, like the `sensors` backend itself
    let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    // Format: pid (comm) state ...; comm may contain spaces and parentheses
    let state = stat
        .rfind(')')
        .and_then(|close| stat.get(close + 1..))
        .and_then(|rest| rest.split_whitespace().next());
    state != Some("Z")
}

/// Returns the PID of a live daemon, removing a stale PID file.
pub fn running_daemon(path: &Path) -> Option<u32> {
    let pid = read_pid(path)?;
    if is_process_running(pid) {
        return Some(pid);
    }
    debug!(pid, path = %path.display(), "Removing stale PID file");
    remove_pid_file(path);
    None
}

/// Fails if a live daemon already owns `path`.
pub fn ensure_not_running(path: &Path) -> Result<()> {
    match running_daemon(path) {
        Some(pid) => Err(DaemonError::AlreadyRunning { pid }),
        None => Ok(()),
    }
}
