//! Layered configuration resolution for Strata
//!
//! This crate resolves dotted/bracketed keys against prioritized sources
//! grouped into profiles. The first source of the active profile holding a
//! key wins, and its value may be post-processed by value resolvers such as
//! the `${ref=...}` reference resolver.
//!
//! ```rust,no_run
//! use strata_config::{Registration, Settings, SettingsOptions, FileSource};
//!
//! let mut settings = Settings::new(SettingsOptions::default())?;
//! settings.add_source(FileSource::new("config/defaults.toml")?, Registration::new())?;
//!
//! settings.set("server.port", 8080)?;
//! let port = settings.get_or("server.port", 80)?;
//! # Ok::<(), strata_config::StrataError>(())
//! ```

pub mod options;
pub mod registry;
pub mod resolver;
pub mod source;

// Re-export main types
pub use options::{SettingsOptions, DEFAULT_PROFILE};
pub use registry::{RegisteredSource, Registration, Settings, TOTAL};
pub use resolver::{ReferenceResolver, ResolverChain, ValueResolver};
pub use source::{
    EnvCase, EnvSource, EnvSourceOptions, FileFormat, FileSource, MemorySource, Source,
    SourceHandle, WritableSource,
};

pub use strata_core::{KeyPath, StrataError, StrataResult, Value};
