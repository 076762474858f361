//! Reference resolver for `${ref=<path>}` and `${ref=<path>#<property>}`.
//!
//! The path names a JSON or TOML document relative to the resolver base.
//! Like a module import, `<path>` is tried as given, then with `.json` and
//! `.toml` appended. Loaded documents are cached for the resolver lifetime.

use std::collections::HashMap;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use strata_core::types::value;
use strata_core::utils::join_under;
use strata_core::{KeyPath, StrataError, StrataResult, Value};

use super::ValueResolver;
use crate::source::file::{load_file, FileFormat};

/// Resolver name
pub const REFERENCE_RESOLVER_NAME: &str = "reference";

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\$\{ref=([^}]+)\}$").expect("reference pattern is valid"));

/// Extensions tried after the exact path
const IMPLICIT_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Loads the document named by a `${ref=...}` marker
#[derive(Debug)]
pub struct ReferenceResolver {
    base: Utf8PathBuf,
    cache: Mutex<HashMap<Utf8PathBuf, Value>>,
}

/// Target of a reference marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Document path relative to the resolver base
    pub path: String,
    /// Property selected inside the document
    pub property: Option<String>,
}

impl Reference {
    /// Parse a marker string, returning `None` if it is not a reference
    pub fn parse(marker: &str) -> Option<Self> {
        let content = REFERENCE_PATTERN.captures(marker)?.get(1)?.as_str();

        // Only the first selector counts: `m#a#b` selects `a`
        let mut parts = content.split('#');
        let path = parts.next().unwrap_or_default();
        let property = parts.next();

        Some(Self {
            path: path.to_string(),
            property: property.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }
}

impl ReferenceResolver {
    /// Create a resolver rooted at `base`
    pub fn new(base: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base: base.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Directory references are resolved against
    pub fn base(&self) -> &Utf8Path {
        &self.base
    }

    /// Load the document named by `reference_path`, using the cache
    fn load(&self, reference_path: &str) -> StrataResult<Value> {
        let target = self.locate(reference_path)?;

        if let Some(cached) = self.cache.lock().get(&target) {
            return Ok(cached.clone());
        }

        let format = FileFormat::from_path(&target)?;
        let document = load_file(&target, format)?;
        self.cache.lock().insert(target, document.clone());

        Ok(document)
    }

    /// Find the file a reference points at
    fn locate(&self, reference_path: &str) -> StrataResult<Utf8PathBuf> {
        let joined = join_under(self.base.as_std_path(), Path::new(reference_path));
        let joined = Utf8PathBuf::from_path_buf(joined).map_err(|p| StrataError::InvalidArguments {
            message: format!("reference path {} is not valid UTF-8", p.display()),
        })?;

        let candidates = std::iter::once(joined.clone()).chain(
            IMPLICIT_EXTENSIONS
                .iter()
                .map(|ext| Utf8PathBuf::from(format!("{}.{}", joined, ext))),
        );

        for candidate in candidates {
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(StrataError::io(
            format!("Cannot find {}", joined),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such reference target"),
        ))
    }
}

impl ValueResolver for ReferenceResolver {
    fn name(&self) -> &str {
        REFERENCE_RESOLVER_NAME
    }

    fn can_resolve(&self, value: &Value) -> bool {
        value.as_str().is_some_and(|s| REFERENCE_PATTERN.is_match(s))
    }

    fn resolve(&self, value: Value) -> StrataResult<Option<Value>> {
        let Some(reference) = value.as_str().and_then(Reference::parse) else {
            return Ok(Some(value));
        };

        let document = match self.load(&reference.path) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(
                    path = %reference.path,
                    base = %self.base,
                    error = %e,
                    "Failed to load the file pointed by the reference"
                );
                return Err(StrataError::resolver_load(self.name(), &reference.path, e));
            },
        };

        match reference.property {
            Some(property) => {
                let selector = KeyPath::parse(&property);
                Ok(value::lookup(&document, selector.segments()).cloned())
            },
            None => Ok(Some(document)),
        }
    }
}
