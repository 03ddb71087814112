//! # Key Store Process Lock
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). Held while a provisioner opens, reads or writes, and closes the
//! key store, so two processes bootstrapping from the same directory cannot
//! both generate and persist a key.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::warn;

use crate::domain::KVStoreError;

/// Exclusive lock on a key store directory. Released on drop (RAII).
#[derive(Debug)]
pub struct StoreLock {
    /// The lock file handle (kept open to maintain lock)
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Lock file name
    pub const LOCK_FILE: &'static str = "IDENTITY.LOCK";

    /// Acquire the lock for `data_dir`, creating the directory if needed.
    ///
    /// Retries with exponential backoff (capped at 500ms) until `timeout`.
    ///
    /// # Errors
    ///
    /// `Locked` if another holder keeps the lock past the timeout, `IOError`
    /// if the lock file cannot be created.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, KVStoreError> {
        std::fs::create_dir_all(data_dir).map_err(|e| KVStoreError::IOError {
            message: format!("{}: {}", data_dir.display(), e),
        })?;

        let path = data_dir.join(Self::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| KVStoreError::IOError {
                message: format!("{}: {}", path.display(), e),
            })?;

        let deadline = Instant::now() + timeout;
        let mut retry_delay = Duration::from_millis(10);
        let mut warned = false;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file, path }),
                Err(_) if Instant::now() < deadline => {
                    if !warned {
                        warn!(path = %path.display(), "Key store is locked, waiting");
                        warned = true;
                    }
                    std::thread::sleep(retry_delay);
                    retry_delay = (retry_delay * 2).min(Duration::from_millis(500));
                }
                Err(_) => {
                    return Err(KVStoreError::Locked {
                        path: path.display().to_string(),
                    })
                }
            }
        }
    }

    /// Get the path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Closing the handle would release it as well.
        let _ = FileExt::unlock(&self.file);
    }
}
