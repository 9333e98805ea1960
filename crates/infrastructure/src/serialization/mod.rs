//! JSON serialization for Tickwatch config files.
//!
//! Written files are stable across runs:
//! - 2-space indentation
//! - Trailing newline
//! - Field order follows the struct definition

mod json;

pub use json::*;
