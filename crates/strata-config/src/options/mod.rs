//! Construction-time options for [`Settings`](crate::Settings)

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use strata_core::{StrataError, StrataResult};

use crate::source::file::line_column;

/// Profile used when none is configured
pub const DEFAULT_PROFILE: &str = "DEFAULT_PROFILE";

/// Default priority of the built-in memory source
pub const DEFAULT_MEMO_SOURCE_PRIORITY: i64 = 1;

/// Default priority of the built-in environment source
pub const DEFAULT_ENV_SOURCE_PRIORITY: i64 = 5;

/// Options recognised when building a [`Settings`](crate::Settings) instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsOptions {
    /// Initially active profile
    pub profile: String,

    /// Register a writable memory source on construction
    pub default_memo_source: bool,

    /// Register an environment source on construction
    pub default_env_source: bool,

    /// Priority of the built-in memory source
    pub default_memo_source_priority: i64,

    /// Priority of the built-in environment source
    pub default_env_source_priority: i64,

    /// Base directory for `${ref=...}` values; no reference resolver if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_base: Option<Utf8PathBuf>,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            default_memo_source: true,
            default_env_source: true,
            default_memo_source_priority: DEFAULT_MEMO_SOURCE_PRIORITY,
            default_env_source_priority: DEFAULT_ENV_SOURCE_PRIORITY,
            reference_base: None,
        }
    }
}

impl SettingsOptions {
    /// Options with no built-in sources
    pub fn empty() -> Self {
        Self {
            default_memo_source: false,
            default_env_source: false,
            ..Self::default()
        }
    }

    /// Set the initially active profile
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Enable `${ref=...}` resolution relative to `base`
    pub fn with_reference_base(mut self, base: impl Into<Utf8PathBuf>) -> Self {
        self.reference_base = Some(base.into());
        self
    }

    /// Parse options from TOML text
    pub fn from_toml_str(content: &str) -> StrataResult<Self> {
        toml::from_str(content).map_err(|e| {
            let (line, column) = e
                .span()
                .map(|span| line_column(content, span.start))
                .unwrap_or((0, 0));

            StrataError::TomlParse {
                message: format!("Invalid settings options: {}", e.message()),
                line,
                column,
            }
        })
    }

    /// Load options from a TOML file
    pub fn load_from_file(path: &Utf8Path) -> StrataResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StrataError::io(format!("Failed to read {}", path), e))?;

        Self::from_toml_str(&content).map_err(|e| match e {
            StrataError::TomlParse { message, line, column } => StrataError::TomlParse {
                message: format!("In file {}: {}", path, message),
                line,
                column,
            },
            other => other,
        })
    }
}
