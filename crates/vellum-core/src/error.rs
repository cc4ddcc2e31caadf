use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VellumError {
    // Locator errors
    #[error("TEMPLATE_NOT_FOUND: template '{name}' not found (tried suffixes: {tried})")]
    TemplateNotFound { name: String, tried: String },

    #[error("TEMPLATE_READ_ERROR: failed to read '{path}': {reason}")]
    TemplateReadError { path: PathBuf, reason: String },

    // Cache errors
    #[error("CACHE_WRITE_FAILURE: failed to write compiled artifact '{path}': {reason}")]
    CacheWriteFailure { path: PathBuf, reason: String },

    #[error("CACHE_READ_FAILURE: failed to read compiled artifact '{path}': {reason}")]
    CacheReadFailure { path: PathBuf, reason: String },

    // Compile / execute errors
    #[error("MALFORMED_DIRECTIVE: {message} (in '{template}', line {line})")]
    MalformedDirective {
        template: String,
        message: String,
        line: usize,
    },

    #[error("INVALID_RULE: pattern '{pattern}' is not a valid regex: {reason}")]
    InvalidRule { pattern: String, reason: String },

    #[error("RENDER_DEPTH_EXCEEDED: nesting deeper than {limit} while rendering '{name}'")]
    RenderDepthExceeded { name: String, limit: usize },

    #[error("EXECUTION_FAILED: '{template}': {reason}")]
    ExecutionFailed { template: String, reason: String },

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParseError(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Lock errors
    #[error("LOCK_FAILED: {0}")]
    LockFailed(String),

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<crate::lock::LockError> for VellumError {
    fn from(err: crate::lock::LockError) -> Self {
        VellumError::LockFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VellumError>;
