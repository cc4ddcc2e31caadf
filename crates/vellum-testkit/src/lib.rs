//! Test utilities for vellum
//!
//! This crate provides shared testing utilities used across the vellum workspace.

mod fixtures;

pub use fixtures::{ViewFixture, age_file, set_mtime};

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// This ensures all test temporary files are centralized in a single location
/// that is gitignored and easy to clean up manually if needed.
///
/// # Panics
///
/// Panics if the current directory is unknown or `.tmp/` cannot be created.
///
/// # Examples
///
/// ```rust
/// use vellum_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("test.txt");
/// std::fs::write(&file_path, "test data").unwrap();
/// // Cleanup happens automatically when temp is dropped
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    try_temp_dir_in_workspace().expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

/// Get the path to a compiled example binary
///
/// Example binaries built by `cargo test` live in `target/debug/examples/`.
///
/// # Panics
///
/// Panics if unable to determine the current executable path
pub fn example_bin(name: &str) -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to get current executable path");

    // target/debug/deps/test_binary -> target/debug/examples/
    path.pop();
    path.pop();
    path.push("examples");
    path.push(name);

    if cfg!(target_os = "windows") {
        path.set_extension("exe");
    }

    path
}
