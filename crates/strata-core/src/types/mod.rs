//! Core data types for Strata configuration resolution.
//!
//! This module provides the fundamental types used throughout Strata:
//! - Key paths addressing nested settings
//! - Dynamic values and nested lookup helpers

pub mod key_path;
pub mod value;

// Re-export all public types
pub use key_path::KeyPath;
pub use value::{lookup, Map, Value};
