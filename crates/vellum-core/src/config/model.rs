use super::consts;
use crate::error::{Result, VellumError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// vellum.toml schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewConfig {
    /// Directory that logical template names are resolved against
    pub view_root: PathBuf,
    /// Directory holding compiled artifacts
    pub cache_dir: PathBuf,
    /// Suffix priority list; replaces the defaults when present
    #[serde(default)]
    pub suffixes: Option<Vec<String>>,
    /// Maximum artifact age in seconds
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// A user substitution rule: regex pattern and its replacement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleConfig {
    pub pattern: String,
    pub replacement: String,
}

fn default_lock_timeout_ms() -> u64 {
    consts::cache::DEFAULT_LOCK_TIMEOUT_MS
}

impl ViewConfig {
    /// Config with defaults for everything but the two directories
    pub fn new(view_root: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            view_root: view_root.into(),
            cache_dir: cache_dir.into(),
            suffixes: None,
            cache_ttl_secs: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            rules: Vec::new(),
        }
    }

    /// Load a vellum.toml file
    ///
    /// Relative directories are resolved against the file's own directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VellumError::ConfigParseError(format!("{}: {}", path.display(), e))
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base)
            .map_err(|e| match e {
                VellumError::ConfigParseError(msg) => {
                    VellumError::ConfigParseError(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })
    }

    /// Parse config text, resolving relative directories against `base`
    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let mut config: ViewConfig =
            toml::from_str(content).map_err(|e| VellumError::ConfigParseError(e.to_string()))?;

        if config.view_root.is_relative() {
            config.view_root = base.join(&config.view_root);
        }
        if config.cache_dir.is_relative() {
            config.cache_dir = base.join(&config.cache_dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(suffixes) = &self.suffixes {
            if suffixes.is_empty() {
                return Err(VellumError::ConfigInvalidValue {
                    field: "suffixes".to_string(),
                    reason: "at least one suffix is required".to_string(),
                });
            }
            if suffixes.iter().any(|s| s.is_empty()) {
                return Err(VellumError::ConfigInvalidValue {
                    field: "suffixes".to_string(),
                    reason: "suffixes must not be empty strings".to_string(),
                });
            }
        }

        if self.lock_timeout_ms == 0 {
            return Err(VellumError::ConfigInvalidValue {
                field: "lock_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
