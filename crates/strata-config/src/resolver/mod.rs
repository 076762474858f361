//! Value resolvers: post-processing of values returned by sources.
//!
//! A resolver recognises an indirection marker in a raw value and replaces
//! it with the value it points to. Resolvers run as a single pass: the first
//! resolver whose `can_resolve` accepts the value produces the result, and
//! that result is never offered to the chain again. A reference that points
//! at another reference is therefore returned as the raw marker, which rules
//! out indirection cycles.

pub mod reference;

use std::fmt;

use strata_core::{StrataResult, Value};

pub use reference::ReferenceResolver;

/// Handler for one kind of indirect value
pub trait ValueResolver: Send + Sync {
    /// Resolver name used in logs and errors
    fn name(&self) -> &str;

    /// Cheap, side-effect free check for the resolver's marker
    fn can_resolve(&self, value: &Value) -> bool;

    /// Dereference `value`.
    ///
    /// `Ok(None)` means the target exists but holds nothing at the requested
    /// location. Load failures are returned, never swallowed.
    fn resolve(&self, value: Value) -> StrataResult<Option<Value>>;
}

/// Ordered list of resolvers tried in registration order
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn ValueResolver>>,
}

impl ResolverChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver to the end of the chain
    pub fn push<R: ValueResolver + 'static>(&mut self, resolver: R) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Number of registered resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Check if no resolver is registered
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Run the first matching resolver over `value`, if any
    pub fn apply(&self, value: Value) -> StrataResult<Option<Value>> {
        match self.resolvers.iter().find(|r| r.can_resolve(&value)) {
            Some(resolver) => {
                tracing::trace!(resolver = resolver.name(), "Resolving indirect value");
                resolver.resolve(value)
            },
            None => Ok(Some(value)),
        }
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}
