//! Advisory write locks for compiled artifacts
//!
//! Two renders (in the same process or in different ones) may decide at the
//! same moment that an artifact is stale. Writers of one cache key are
//! serialized through an fs2 exclusive lock on a sibling `<key>.lock` file.
//! Readers never take the lock: artifacts are replaced by rename, so a reader
//! sees either the old or the new file, never a partial one.

use std::path::Path;
use std::time::Duration;

mod acquire;
mod error;
mod guard;

pub use error::LockError;
pub use guard::WriteLock;


/// Acquires the exclusive write lock at `lock_path`, waiting at most `timeout`.
///
/// Retries with exponential backoff while another holder has the lock.
/// `artifact` names what is being written and shows up in wait logs and
/// timeout errors.
///
/// # Examples
///
/// ```no_run
/// use vellum_core::lock::lock_for_write;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = lock_for_write(Path::new("/tmp/views/abc.lock"), Duration::from_secs(30), "abc")?;
/// // write the artifact
/// drop(guard);
/// # Ok(())
/// # }
/// ```
pub fn lock_for_write(
    lock_path: &Path,
    timeout: Duration,
    artifact: &str,
) -> Result<WriteLock, LockError> {
    acquire::acquire_with_backoff(lock_path, timeout, artifact)
}
