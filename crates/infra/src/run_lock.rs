//! Single-run lock using a PID file
//!
//! Two sync runs against the same database must never process partners at
//! the same time; the CLI holds this lock for the whole run.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use stocksync_domain::{Result, StockSyncError};

const PID_FILE_NAME: &str = "stocksync.pid";

/// Held for the duration of one sync run; released on drop.
#[derive(Debug)]
pub struct RunLock {
    pid_file: PathBuf,
}

impl RunLock {
    /// Take the lock in `lock_dir`.
    ///
    /// A PID file left behind by a process that is no longer running is
    /// replaced. Returns an error if another run is in progress.
    pub fn acquire<P: AsRef<Path>>(lock_dir: P) -> Result<Self> {
        let pid_file = lock_dir.as_ref().join(PID_FILE_NAME);

        if let Ok(content) = fs::read_to_string(&pid_file) {
            match content.trim().parse::<u32>() {
                Ok(pid) if is_process_running(pid) => {
                    tracing::warn!(existing_pid = pid, "run_lock.process_active");
                    return Err(StockSyncError::Internal(format!(
                        "Another sync run is already in progress (PID: {pid})"
                    )));
                }
                Ok(pid) => tracing::warn!(stale_pid = pid, "run_lock.stale_pid_file_detected"),
                Err(_) => tracing::warn!(path = %pid_file.display(), "run_lock.unreadable_pid_file"),
            }
            if let Err(err) = fs::remove_file(&pid_file) {
                tracing::warn!(error = %err, path = %pid_file.display(), "run_lock.remove_stale_pid_failed");
            }
        }

        let current_pid = std::process::id();
        let mut file =
            OpenOptions::new().write(true).create_new(true).open(&pid_file).map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    StockSyncError::Internal("Another sync run acquired the lock first".into())
                } else {
                    StockSyncError::Internal(format!("Failed to create PID file: {e}"))
                }
            })?;
        file.write_all(current_pid.to_string().as_bytes())
            .map_err(|e| StockSyncError::Internal(format!("Failed to write PID file: {e}")))?;

        tracing::info!(pid = current_pid, path = %pid_file.display(), "run_lock.acquired");

        Ok(Self { pid_file })
    }

    pub fn path(&self) -> &Path {
        &self.pid_file
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.pid_file) {
            tracing::warn!(error = %e, path = %self.pid_file.display(), "run_lock.remove_pid_failed");
        } else {
            tracing::debug!(path = %self.pid_file.display(), "run_lock.released");
        }
    }
}

#[cfg(target_os = "linux")]
fn is_process_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_running(pid: u32) -> bool {
    use std::process::Command;

    // `kill -0` probes for the process without signalling it
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_process_running(pid: u32) -> bool {
    tracing::warn!(pid, "run_lock.process_check_unsupported");
    false
}
