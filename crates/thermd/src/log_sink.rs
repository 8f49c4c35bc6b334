//! Append-only readings log.
//!
//! The log is the daemon's only user-visible output. Each record is
//! flushed and synced before `append` returns, so a kill between cycles
//! never loses an earlier reading.

use std::path::{Path, PathBuf};

use therm_core::Reading;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{DaemonError, Result};

/// Open handle on the readings log.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    /// Opens `path` for appending, creating the file if needed.
    ///
    /// A missing parent directory is created first; if that fails the
    /// open fails too.
    ///
    /// # Errors
    ///
    /// Returns [`DaemonError::LogOpen`] when the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                debug!(dir = %parent.display(), error = %e, "Failed to create log directory");
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| DaemonError::LogOpen {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Opened readings log");
        Ok(Self { path, file })
    }

    /// Returns the log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and forces it to durable storage.
    pub async fn append(&mut self, reading: &Reading) -> std::io::Result<()> {
        self.file.write_all(reading.log_record().as_bytes()).await?;
        self.file.flush().await?;
        self.file.sync_data().await
    }
}
