//! Tests for the compiled-artifact interpreter
//!
//! Organized into focused submodules.

use super::*;

// Test helper functions
mod helpers;

// Tag scanning and block structure
mod blocks;
