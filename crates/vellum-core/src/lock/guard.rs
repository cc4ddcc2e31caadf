use std::fs::File;
use std::path::{Path, PathBuf};

/// Held while an artifact is being written; unlocks on drop.
///
/// fs2 locks are tied to the file descriptor, so closing `file` releases it.
#[derive(Debug)]
pub struct WriteLock {
    pub(crate) file: File,
    pub(crate) path: PathBuf,
}

impl WriteLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            log::debug!("unlock of {} failed: {}", self.path.display(), e);
        }
    }
}
