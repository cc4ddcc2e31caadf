//! Lock error type

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum LockError {
    /// Another writer held the lock for longer than the timeout
    Timeout {
        path: PathBuf,
        /// Cache key of the artifact being written
        artifact: String,
        waited: Duration,
    },
    Io {
        source: std::io::Error,
        path: PathBuf,
        operation: &'static str,
    },
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Timeout {
                path,
                artifact,
                waited,
            } => write!(
                f,
                "gave up on {} after {}ms (artifact {})",
                path.display(),
                waited.as_millis(),
                artifact
            ),
            LockError::Io {
                source,
                path,
                operation,
            } => write!(f, "cannot {} {}: {}", operation, path.display(), source),
        }
    }
}

impl std::error::Error for LockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LockError::Timeout { .. } => None,
            LockError::Io { source, .. } => Some(source),
        }
    }
}
