//! # strata-core
//!
//! Core types and utilities shared across all Strata crates.
//!
//! This crate provides:
//! - `KeyPath`, the parsed form of dotted/bracketed setting keys
//! - `Value` helpers for nested lookup and insertion
//! - `StrataError` enum for unified error handling
//! - Path utilities used by file-backed sources and resolvers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (KeyPath, Value)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{StrataError, StrataResult};
pub use types::{KeyPath, Value};
