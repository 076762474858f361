//! Environment variable source
//!
//! Key segments are case-converted and joined with a separator, so with the
//! defaults `db.host` reads `DB__HOST`. Asking for a prefix of several
//! variables (`db`) yields an object built from every `DB__*` variable.
//! The environment is captured once as a snapshot; later changes to the
//! process environment are not observed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_core::types::value::{self, Map};
use strata_core::{KeyPath, StrataError, StrataResult, Value};

use super::Source;

/// Default name of the environment source
pub const ENV_SOURCE_NAME: &str = "env";

/// Default separator between key segments
pub const DEFAULT_SEPARATOR: &str = "__";

/// Letter case applied to key segments before lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvCase {
    /// Uppercase every segment
    #[default]
    Upper,
    /// Lowercase every segment
    Lower,
    /// Use segments as given
    NoChange,
}

impl EnvCase {
    fn apply(self, segment: &str) -> String {
        match self {
            EnvCase::Upper => segment.to_uppercase(),
            EnvCase::Lower => segment.to_lowercase(),
            EnvCase::NoChange => segment.to_string(),
        }
    }
}

/// Options for [`EnvSource`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvSourceOptions {
    /// Source name
    pub name: String,
    /// Prefix prepended (and case-converted) before the key
    pub prefix: Option<String>,
    /// Separator joining segments
    pub separator: String,
    /// Letter case applied to segments
    pub case: EnvCase,
}

impl Default for EnvSourceOptions {
    fn default() -> Self {
        Self {
            name: ENV_SOURCE_NAME.to_string(),
            prefix: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            case: EnvCase::Upper,
        }
    }
}

/// Read-only source over an environment snapshot
#[derive(Debug, Clone)]
pub struct EnvSource {
    vars: BTreeMap<String, String>,
    options: EnvSourceOptions,
}

impl EnvSource {
    /// Create an environment source over `vars` with default options
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: collect_vars(vars),
            options: EnvSourceOptions::default(),
        }
    }

    /// Create an environment source over `vars` with custom options
    pub fn with_options<I, K, V>(vars: I, options: EnvSourceOptions) -> StrataResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if options.separator.is_empty() {
            return Err(StrataError::InvalidArguments {
                message: "environment key separator must not be empty".to_string(),
            });
        }

        Ok(Self {
            vars: collect_vars(vars),
            options,
        })
    }

    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        Self::new(std::env::vars())
    }

    /// Options this source was built with
    pub fn options(&self) -> &EnvSourceOptions {
        &self.options
    }

    /// Environment variable name addressed by `path`
    pub fn variable_name(&self, path: &KeyPath) -> String {
        let case = self.options.case;
        let mut parts: Vec<String> = Vec::with_capacity(path.len() + 1);

        if let Some(prefix) = &self.options.prefix {
            parts.push(case.apply(prefix));
        }
        parts.extend(path.iter().map(|segment| case.apply(segment)));

        parts.join(&self.options.separator)
    }

    /// Fold every variable below `name` into a nested object.
    ///
    /// When one variable is both a value and the parent of deeper variables
    /// (`A__B` and `A__B__C`), the deeper variables win and the shorter
    /// variable's value is left out of the folded object. It is still
    /// returned when addressed directly.
    fn collect_nested(&self, name: &str) -> Option<Value> {
        let separator = &self.options.separator;
        let nested_prefix = format!("{}{}", name, separator);
        let mut tree = Value::Object(Map::new());
        let mut found = false;

        for (key, raw) in self.vars.range(nested_prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&nested_prefix) else {
                break;
            };

            let segments: Vec<&str> = rest.split(separator.as_str()).collect();
            value::insert(&mut tree, &segments, Value::String(raw.clone()));
            found = true;
        }

        found.then_some(tree)
    }
}

impl Source for EnvSource {
    fn name(&self) -> &str {
        &self.options.name
    }

    fn get(&self, path: &KeyPath) -> StrataResult<Option<Value>> {
        let name = self.variable_name(path);

        if let Some(raw) = self.vars.get(&name) {
            return Ok(Some(Value::String(raw.clone())));
        }

        Ok(self.collect_nested(&name))
    }
}

fn collect_vars<I, K, V>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
