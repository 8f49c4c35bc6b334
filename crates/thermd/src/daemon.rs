//! Detaching from the controlling terminal.
//!
//! Uses the classic double fork:
//!
//! 1. `fork()`: the parent exits 0, the child is orphaned and is not a
//!    process group leader.
//! 2. `setsid()`: the child becomes leader of a new session with no
//!    controlling terminal.
//! 3. `fork()` again: the intermediate exits 0; the grandchild is not a
//!    session leader and can never reacquire a terminal.
//!
//! The surviving process then clears its umask, moves to `/`, and rebinds
//! stdin/stdout/stderr to `/dev/null`.
//!
//! Detaching must happen before the tokio runtime, the tracing subscriber
//! or any file handle the caller relies on is created.

use std::path::PathBuf;

use daemonize::Daemonize;
use tracing::debug;

use crate::error::{DaemonError, Result};

/// Working directory of the detached process.
pub const DAEMON_WORKING_DIR: &str = "/";

/// File creation mask of the detached process (unrestricted).
pub const DAEMON_UMASK: libc::mode_t = 0;

/// Settings for [`detach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachOptions {
    pub working_directory: PathBuf,
    pub umask: libc::mode_t,
}

impl Default for DetachOptions {
    fn default() -> Self {
        Self {
            working_directory: PathBuf::from(DAEMON_WORKING_DIR),
            umask: DAEMON_UMASK,
        }
    }
}

/// Detaches the calling process from its terminal and session.
///
/// Returns only in the final grandchild. The calling process and the
/// intermediate child exit with status 0 inside this call. Standard
/// streams default to `/dev/null` in `daemonize`, reads see EOF and
/// writes are discarded.
///
/// # Errors
///
/// Returns [`DaemonError::Detach`] if a fork, `setsid()` or the directory
/// change fails. Callers should exit immediately: the process may already
/// be half detached.
pub fn detach(options: &DetachOptions) -> Result<()> {
    Daemonize::new()
        .working_directory(&options.working_directory)
        .umask(options.umask)
        .start()
        .map_err(|e| DaemonError::Detach(e.to_string()))?;

    debug!(pid = std::process::id(), "Detached from terminal");
    Ok(())
}
