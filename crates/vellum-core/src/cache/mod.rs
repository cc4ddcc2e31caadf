//! Compile cache - persisted artifacts keyed by the source template's path
//!
//! The key is the SHA-256 of the absolute source path, not of its content, so
//! one source file always maps to one artifact that is overwritten on every
//! recompile. Staleness compares modification times: the artifact has to be
//! strictly newer than its source.

use crate::config::consts;
use crate::error::{Result, VellumError};
use crate::lock;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;

/// How long a writer waits for another writer of the same key
pub const DEFAULT_LOCK_TIMEOUT: Duration =
    Duration::from_millis(consts::cache::DEFAULT_LOCK_TIMEOUT_MS);

/// Hex SHA-256 of an absolute template path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CompileCache {
    cache_dir: PathBuf,
    ttl: Option<Duration>,
    lock_timeout: Duration,
}

impl CompileCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Treat artifacts older than `ttl` as stale even if the source is unchanged
    pub fn set_ttl(&mut self, ttl: Option<Duration>) {
        self.ttl = ttl;
    }

    pub fn set_lock_timeout(&mut self, timeout: Duration) {
        self.lock_timeout = timeout;
    }

    pub fn key_for(&self, source: &Path) -> CacheKey {
        let digest = Sha256::digest(source.to_string_lossy().as_bytes());
        CacheKey(format!("{:x}", digest))
    }

    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.as_str())
    }

    fn lock_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.lock", key))
    }

    /// Whether the artifact for `key` must be regenerated from `source`.
    ///
    /// True when the artifact is missing, when its mtime is not strictly after
    /// the source's mtime, or when it outlived the configured TTL.
    pub fn is_stale(&self, source: &Path, key: &CacheKey) -> Result<bool> {
        let source_modified = modified(source).map_err(|e| VellumError::TemplateReadError {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        let artifact = self.artifact_path(key);
        // An unreadable artifact is treated like a missing one; the store that
        // follows reports the underlying problem
        let artifact_modified = match modified(&artifact) {
            Ok(time) => time,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::debug!("cannot stat {}: {}", artifact.display(), e);
                }
                return Ok(true);
            }
        };

        if artifact_modified <= source_modified {
            return Ok(true);
        }

        if let Some(ttl) = self.ttl {
            // A clock that went backwards counts as expired
            let age = SystemTime::now()
                .duration_since(artifact_modified)
                .unwrap_or(Duration::MAX);
            if age > ttl {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Persist a compiled artifact, replacing any previous one atomically.
    ///
    /// 1. Take the exclusive write lock for this key
    /// 2. Write into a temp file inside the cache directory
    /// 3. Fsync and rename over the artifact path
    pub fn store(&self, key: &CacheKey, compiled: &str) -> Result<PathBuf> {
        let artifact = self.artifact_path(key);
        let write_failure = |reason: String| VellumError::CacheWriteFailure {
            path: artifact.clone(),
            reason,
        };

        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| write_failure(format!("cannot create cache directory: {}", e)))?;

        let _lock = lock::lock_for_write(&self.lock_path(key), self.lock_timeout, key.as_str())
            .map_err(|e| write_failure(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| write_failure(format!("cannot create temp file: {}", e)))?;
        temp.write_all(compiled.as_bytes())
            .map_err(|e| write_failure(format!("cannot write temp file: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| write_failure(format!("cannot sync temp file: {}", e)))?;
        temp.persist(&artifact)
            .map_err(|e| write_failure(format!("cannot persist: {}", e)))?;

        #[cfg(unix)]
        {
            if let Err(e) = File::open(&self.cache_dir).and_then(|dir| dir.sync_all()) {
                log::debug!("fsync of {} failed: {}", self.cache_dir.display(), e);
            }
        }

        log::debug!("stored artifact {}", artifact.display());
        Ok(artifact)
    }

    pub fn load(&self, key: &CacheKey) -> Result<String> {
        let artifact = self.artifact_path(key);
        fs::read_to_string(&artifact).map_err(|e| VellumError::CacheReadFailure {
            path: artifact,
            reason: e.to_string(),
        })
    }
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

#[cfg(test)]
mod tests;
