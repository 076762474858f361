//! Priority-ordered, profiled source registry and key resolution.
//!
//! Sources are kept in one list sorted ascending by priority; a lower number
//! is consulted first. Sources registered with equal priority keep their
//! registration order. Only sources of the active profile take part in
//! `get` and `set`.
//!
//! Registration needs `&mut self` while lookups need `&self`, so all sources
//! must be registered before a `Settings` is shared between readers.

use std::collections::HashSet;

use indexmap::IndexMap;
use strata_core::{KeyPath, StrataError, StrataResult, Value};
use tracing::{debug, trace, warn};

use crate::options::SettingsOptions;
use crate::resolver::{ReferenceResolver, ResolverChain, ValueResolver};
use crate::source::{EnvSource, MemorySource, SourceHandle};

/// Reserved counter key holding the number of sources across all profiles
pub const TOTAL: &str = "total";

/// Where and how urgently a source is consulted.
///
/// A missing priority defaults to one above the highest priority registered
/// so far; a missing profile defaults to the active profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Lookup priority, lower is consulted first
    pub priority: Option<i64>,
    /// Profile the source belongs to
    pub profile: Option<String>,
}

impl Registration {
    /// Registration using every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit priority
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set an explicit profile
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// A source together with its resolved registration
#[derive(Debug, Clone)]
pub struct RegisteredSource {
    priority: i64,
    profile: String,
    source: SourceHandle,
}

impl RegisteredSource {
    /// Lookup priority
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Owning profile
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// The registered source
    pub fn source(&self) -> &SourceHandle {
        &self.source
    }
}

/// Layered settings resolved from prioritized, profiled sources
#[derive(Debug)]
pub struct Settings {
    /// Active profile
    profile: String,
    /// Registered sources, ascending by priority
    sources: Vec<RegisteredSource>,
    /// `profile:name` keys already taken
    name_keys: HashSet<String>,
    /// Registrations per profile, plus `total`
    counter: IndexMap<String, usize>,
    /// Highest priority registered so far
    highest_priority: i64,
    /// Post-processing applied to found values
    resolvers: ResolverChain,
}

impl Settings {
    /// Build settings from `options`, snapshotting the process environment
    /// for the built-in environment source.
    pub fn new(options: SettingsOptions) -> StrataResult<Self> {
        let env = options.default_env_source.then(EnvSource::from_process);
        Self::build(options, env)
    }

    /// Build settings from `options` over an explicit environment snapshot
    pub fn with_environment<I, K, V>(options: SettingsOptions, vars: I) -> StrataResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = options.default_env_source.then(|| EnvSource::new(vars));
        Self::build(options, env)
    }

    fn build(options: SettingsOptions, env: Option<EnvSource>) -> StrataResult<Self> {
        let mut settings = Self {
            profile: options.profile.clone(),
            sources: Vec::new(),
            name_keys: HashSet::new(),
            counter: IndexMap::from([(TOTAL.to_string(), 0)]),
            highest_priority: 0,
            resolvers: ResolverChain::new(),
        };

        if let Some(base) = &options.reference_base {
            settings.add_resolver(ReferenceResolver::new(base.clone()));
        }

        if options.default_memo_source {
            settings.add_source(
                MemorySource::default(),
                Registration::new()
                    .with_priority(options.default_memo_source_priority)
                    .with_profile(options.profile.clone()),
            )?;
        }

        if let Some(env) = env {
            settings.add_source(
                env,
                Registration::new()
                    .with_priority(options.default_env_source_priority)
                    .with_profile(options.profile.clone()),
            )?;
        }

        Ok(settings)
    }

    /// Register a source.
    ///
    /// # Errors
    ///
    /// - `ReservedProfileName` if the profile is `total`
    /// - `InvalidArguments` if the profile or source name is empty
    /// - `DuplicateSourceName` if the profile already has a source with this name
    pub fn add_source(
        &mut self,
        source: impl Into<SourceHandle>,
        registration: Registration,
    ) -> StrataResult<()> {
        let source = source.into();
        let priority = registration
            .priority
            .unwrap_or_else(|| self.highest_priority.saturating_add(1));
        let profile = registration.profile.unwrap_or_else(|| self.profile.clone());

        if profile == TOTAL {
            return Err(StrataError::ReservedProfileName { profile });
        }
        if profile.is_empty() {
            return Err(StrataError::InvalidArguments {
                message: format!("source '{}' registered with an empty profile name", source.name()),
            });
        }
        if source.name().is_empty() {
            return Err(StrataError::InvalidArguments {
                message: format!("source in profile '{}' has an empty name", profile),
            });
        }

        let composed_name = format!("{}:{}", profile, source.name());
        if self.name_keys.contains(&composed_name) {
            return Err(StrataError::DuplicateSourceName {
                name: source.name().to_string(),
                profile,
            });
        }

        self.name_keys.insert(composed_name);
        self.highest_priority = self.highest_priority.max(priority);
        *self.counter.entry(profile.clone()).or_insert(0) += 1;
        *self.counter.entry(TOTAL.to_string()).or_insert(0) += 1;

        debug!(
            name = source.name(),
            profile = %profile,
            priority,
            writable = source.is_writable(),
            "New source added"
        );

        // After every equal priority, so ties keep registration order
        let index = self.sources.partition_point(|entry| entry.priority <= priority);
        self.sources.insert(
            index,
            RegisteredSource {
                priority,
                profile,
                source,
            },
        );

        Ok(())
    }

    /// Append a value resolver to the resolver chain
    pub fn add_resolver<R: ValueResolver + 'static>(&mut self, resolver: R) {
        debug!(resolver = resolver.name(), "Value resolver added");
        self.resolvers.push(resolver);
    }

    /// Number of sources registered under `profile`, or across all
    /// profiles when `None`. Unknown profiles count zero.
    pub fn count(&self, profile: Option<&str>) -> usize {
        self.counter
            .get(profile.unwrap_or(TOTAL))
            .copied()
            .unwrap_or(0)
    }

    /// Profiles that have registered sources, in first-registration order
    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.counter
            .keys()
            .map(String::as_str)
            .filter(|profile| *profile != TOTAL)
    }

    /// Switch the active profile. Unknown profiles are accepted and
    /// simply resolve nothing.
    pub fn change_profile(&mut self, profile: impl Into<String>) {
        let profile = profile.into();
        debug!(from = %self.profile, to = %profile, "Profile changed");
        self.profile = profile;
    }

    /// The active profile
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// All registered sources, ascending by priority
    pub fn sources(&self) -> impl Iterator<Item = &RegisteredSource> {
        self.sources.iter()
    }

    /// Sources of the active profile, ascending by priority
    fn active_sources(&self) -> impl Iterator<Item = &RegisteredSource> {
        self.sources
            .iter()
            .filter(move |entry| entry.profile == self.profile)
    }

    /// Resolve `key` against the active profile.
    ///
    /// The first source returning a value wins; that value is passed through
    /// the resolver chain once. Returns `Ok(None)` when no source has the key.
    pub fn get(&self, key: &str) -> StrataResult<Option<Value>> {
        let path = KeyPath::parse(key);

        for entry in self.active_sources() {
            match entry.source.get(&path)? {
                Some(raw) => {
                    trace!(key, source = entry.source.name(), "Setting found");
                    return self.resolvers.apply(raw);
                },
                None => {
                    trace!(key, source = entry.source.name(), "Setting not in source");
                },
            }
        }

        Ok(None)
    }

    /// Resolve `key`, falling back to `default` when nothing is found
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> StrataResult<Value> {
        Ok(self.get(key)?.unwrap_or_else(|| default.into()))
    }

    /// Resolve `key`, failing if it is missing or null
    pub fn get_required(&self, key: &str) -> StrataResult<Value> {
        match self.get(key)? {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(StrataError::MissingRequiredSetting {
                key: key.to_string(),
            }),
        }
    }

    /// Resolve `key` with a fallback, failing if the result is still null
    pub fn get_required_or(&self, key: &str, default: impl Into<Value>) -> StrataResult<Value> {
        let value = self.get_or(key, default)?;
        if value.is_null() {
            return Err(StrataError::MissingRequiredSetting {
                key: key.to_string(),
            });
        }
        Ok(value)
    }

    /// Write `value` to every writable source of the active profile.
    ///
    /// # Errors
    ///
    /// `NoWritableSource` if the active profile has no writable source. The
    /// first source error aborts the fan-out and is returned.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> StrataResult<()> {
        let path = KeyPath::parse(key);
        let value = value.into();
        let mut written = 0usize;

        for entry in self.active_sources() {
            let Some(writable) = entry.source.as_writable() else {
                continue;
            };

            if let Err(e) = writable.set(&path, value.clone()) {
                warn!(key, source = writable.name(), error = %e, "Failed to write setting");
                return Err(e);
            }
            written += 1;
        }

        if written == 0 {
            return Err(StrataError::NoWritableSource {
                profile: self.profile.clone(),
            });
        }

        trace!(key, sources = written, "Setting written");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
