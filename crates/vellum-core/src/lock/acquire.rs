//! Lock acquisition with backoff and timeout

use super::{LockError, WriteLock};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(5);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(250);
const WAIT_WARNING_THRESHOLD: Duration = Duration::from_secs(2);

pub(crate) fn acquire_with_backoff(
    lock_path: &Path,
    timeout: Duration,
    artifact: &str,
) -> Result<WriteLock, LockError> {
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent).map_err(|e| LockError::Io {
            source: e,
            path: lock_path.to_path_buf(),
            operation: "create cache directory",
        })?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| LockError::Io {
            source: e,
            path: lock_path.to_path_buf(),
            operation: "open lock file",
        })?;

    let start = Instant::now();
    let mut delay = INITIAL_RETRY_DELAY;
    let mut warned = false;

    loop {
        match file.try_lock_exclusive() {
            Ok(()) => {
                return Ok(WriteLock {
                    file,
                    path: lock_path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                let waited = start.elapsed();
                if waited >= timeout {
                    return Err(LockError::Timeout {
                        path: lock_path.to_path_buf(),
                        artifact: artifact.to_string(),
                        waited,
                    });
                }

                if !warned && waited >= WAIT_WARNING_THRESHOLD {
                    log::warn!(
                        "waiting for write lock on {} (artifact {})",
                        lock_path.display(),
                        artifact
                    );
                    warned = true;
                }

                thread::sleep(delay);
                delay = (delay * 2).min(MAX_RETRY_DELAY);
            }
            Err(e) => {
                return Err(LockError::Io {
                    source: e,
                    path: lock_path.to_path_buf(),
                    operation: "lock",
                });
            }
        }
    }
}
