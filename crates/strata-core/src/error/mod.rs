//! Error types and result aliases for Strata operations.
//!
//! Provides a unified error type that covers registration, lookup, mutation
//! and value resolution failures, together with the failures raised by the
//! built-in source adapters.

use thiserror::Error;

/// Unified error type for all Strata operations
#[derive(Error, Debug)]
pub enum StrataError {
    // Registration errors
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("'{profile}' is a reserved keyword and can't be used as a profile")]
    ReservedProfileName { profile: String },

    #[error("The name '{name}' already exists in the '{profile}' profile")]
    DuplicateSourceName { name: String, profile: String },

    // Lookup errors
    #[error("No available setting for key '{key}'")]
    MissingRequiredSetting { key: String },

    #[error("There is no source in the '{profile}' profile that supports writes")]
    NoWritableSource { profile: String },

    // Resolver errors
    #[error("Resolver '{resolver}' failed to load '{path}'")]
    ResolverLoadFailure {
        resolver: String,
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // Source adapter errors
    #[error("Failed to parse JSON: {message}")]
    JsonParse { message: String },

    #[error("Failed to parse TOML: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Unsupported file format '{extension}' for {path}")]
    UnsupportedFormat { path: String, extension: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Strata operations
pub type StrataResult<T> = Result<T, StrataError>;

impl StrataError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a resolver load failure from any error type
    pub fn resolver_load<E>(resolver: &str, path: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ResolverLoadFailure {
            resolver: resolver.to_string(),
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    /// Check if this error was raised while registering a source
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            StrataError::InvalidArguments { .. }
                | StrataError::ReservedProfileName { .. }
                | StrataError::DuplicateSourceName { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            StrataError::ReservedProfileName { .. } => {
                Some("Pick another profile name; 'total' is used for the aggregate source count")
            },
            StrataError::DuplicateSourceName { .. } => {
                Some("Give the source a distinct name or register it under another profile")
            },
            StrataError::MissingRequiredSetting { .. } => {
                Some("Provide the setting in one of the active profile's sources or pass a default")
            },
            StrataError::NoWritableSource { .. } => {
                Some("Register a writable source such as a memory source in the active profile")
            },
            StrataError::ResolverLoadFailure { .. } => {
                Some("Check that the referenced file exists relative to the resolver base path")
            },
            _ => None,
        }
    }
}
