//! Utility functions and helpers.
//!
//! Common functionality used across multiple Strata crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{get_extension, join_under, normalize_path};
