//! Workflow locking so only one git-aware snapshot mutates a repository at a time
//!
//! The speculative merge checks out branches and touches the stash; two of them
//! interleaving on one working tree would corrupt both. The lock lives inside
//! the git directory so it never shows up as a working-tree change, and it is
//! released automatically when dropped.

use crate::errors::WorkflowError;
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

/// File name of the lock inside the git directory
pub const LOCK_FILE: &str = "treesnap.lock";

/// Locks older than this are assumed to belong to a crashed process
const STALE_THRESHOLD: Duration = Duration::from_secs(300);

/// Holds the exclusive workflow lock for one repository
///
/// The lock is automatically released when this struct is dropped.
#[derive(Debug)]
pub struct WorkflowLock {
    /// Lock file handle
    lock_file: File,
    /// Path to the lock file (for error messages)
    lock_path: PathBuf,
}

impl WorkflowLock {
    /// Acquire the workflow lock in `git_dir`
    ///
    /// Waits briefly for a competing snapshot to finish before giving up.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The lock file cannot be created
    /// - Another snapshot still holds the lock after the timeout
    ///   ([`WorkflowError::Busy`])
    pub fn acquire(git_dir: &Path) -> Result<Self> {
        let lock_path = git_dir.join(LOCK_FILE);

        Self::cleanup_stale_lock(&lock_path);

        let lock_file = Self::try_acquire_lock(&lock_path)?;
        debug!(lock = %lock_path.display(), "workflow lock acquired");

        Ok(Self {
            lock_file,
            lock_path,
        })
    }

    /// Path of the held lock file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// Try to acquire the lock file
    fn try_acquire_lock(lock_path: &Path) -> Result<File> {
        // Use shorter timeouts in test mode for faster test execution
        let lock_timeout = if cfg!(test) {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(10)
        };
        let retry_interval = if cfg!(test) {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(100)
        };

        let start = Instant::now();

        loop {
            let file = fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(lock_path)
                .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

            match file.try_lock_exclusive() {
                Ok(true) => {
                    // Record the holder for whoever finds a stale lock
                    use std::io::Write;
                    let _ = file.set_len(0);
                    let mut file_ref = &file;
                    let _ = writeln!(
                        file_ref,
                        "operation=snapshot\npid={}\ntime={}",
                        std::process::id(),
                        humantime::format_rfc3339(SystemTime::now())
                    );
                    return Ok(file);
                }
                Ok(false) | Err(_) if start.elapsed() < lock_timeout => {
                    std::thread::sleep(retry_interval);
                }
                Ok(false) | Err(_) => {
                    return Err(WorkflowError::Busy(lock_path.to_path_buf()).into());
                }
            }
        }
    }

    /// Remove the lock file if it is older than [`STALE_THRESHOLD`]
    ///
    /// This handles a process that crashed without releasing its lock.
    fn cleanup_stale_lock(lock_path: &Path) {
        if let Ok(metadata) = fs::metadata(lock_path)
            && let Ok(modified) = metadata.modified()
            && let Ok(elapsed) = modified.elapsed()
            && elapsed > STALE_THRESHOLD
        {
            if let Err(e) = fs::remove_file(lock_path) {
                warn!(lock = %lock_path.display(), error = %e, "failed to remove stale lock");
            } else {
                debug!(lock = %lock_path.display(), "removed stale lock");
            }
        }
    }
}

impl Drop for WorkflowLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock_file);

        if let Err(e) = fs::remove_file(&self.lock_path) {
            warn!(lock = %self.lock_path.display(), error = %e, "failed to remove lock file");
        }
    }
}
