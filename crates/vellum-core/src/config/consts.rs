//! Constants shared across the crate

/// Configuration file looked up by the CLI when `--config` is not given
pub const CONFIG_FILE_NAME: &str = "vellum.toml";

/// Compile cache limits
pub mod cache {
    /// How long a writer waits for another writer of the same key (ms)
    pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;
}

/// Render limits
pub mod render {
    /// Deepest allowed chain of nested extends/include renders
    pub const MAX_DEPTH: usize = 64;
}
