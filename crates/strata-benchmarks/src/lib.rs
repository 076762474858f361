//! Strata benchmarking suite
//!
//! This crate contains benchmarks for key parsing and for resolving keys
//! through stacks of prioritized sources.

pub mod common;

pub use common::*;
