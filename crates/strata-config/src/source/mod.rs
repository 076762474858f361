//! Source adapter contracts and the built-in adapters.
//!
//! A source answers lookups for a key path. Writable sources additionally
//! accept `set`; the capability is fixed when the source is wrapped in a
//! [`SourceHandle`], not probed on every call.

pub mod env;
pub mod file;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use strata_core::{KeyPath, StrataResult, Value};

pub use env::{EnvCase, EnvSource, EnvSourceOptions};
pub use file::{FileFormat, FileSource};
pub use memory::MemorySource;

/// A read-only configuration backend
pub trait Source: Send + Sync {
    /// Name of the source, unique within a profile
    fn name(&self) -> &str;

    /// Look up the value at `path`.
    ///
    /// `Ok(None)` means the source has nothing there and the lookup falls
    /// through to the next source. May return a nested object when `path`
    /// is a prefix of deeper keys.
    fn get(&self, path: &KeyPath) -> StrataResult<Option<Value>>;
}

/// A configuration backend that also accepts writes
pub trait WritableSource: Source {
    /// Store `value` at `path`
    fn set(&self, path: &KeyPath, value: Value) -> StrataResult<()>;
}

/// A registered source together with its write capability
#[derive(Clone)]
pub enum SourceHandle {
    /// Source that only answers lookups
    ReadOnly(Arc<dyn Source>),
    /// Source that answers lookups and accepts writes
    ReadWrite(Arc<dyn WritableSource>),
}

impl SourceHandle {
    /// Wrap a read-only source
    pub fn read_only<S: Source + 'static>(source: S) -> Self {
        Self::ReadOnly(Arc::new(source))
    }

    /// Wrap a writable source
    pub fn read_write<S: WritableSource + 'static>(source: S) -> Self {
        Self::ReadWrite(Arc::new(source))
    }

    /// Name of the wrapped source
    pub fn name(&self) -> &str {
        match self {
            SourceHandle::ReadOnly(source) => source.name(),
            SourceHandle::ReadWrite(source) => source.name(),
        }
    }

    /// Look up a value in the wrapped source
    pub fn get(&self, path: &KeyPath) -> StrataResult<Option<Value>> {
        match self {
            SourceHandle::ReadOnly(source) => source.get(path),
            SourceHandle::ReadWrite(source) => source.get(path),
        }
    }

    /// The writable view of the source, if it has one
    pub fn as_writable(&self) -> Option<&dyn WritableSource> {
        match self {
            SourceHandle::ReadOnly(_) => None,
            SourceHandle::ReadWrite(source) => Some(source.as_ref()),
        }
    }

    /// Check if the source accepts writes
    pub fn is_writable(&self) -> bool {
        matches!(self, SourceHandle::ReadWrite(_))
    }
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_writable() { "ReadWrite" } else { "ReadOnly" };
        f.debug_struct("SourceHandle")
            .field("name", &self.name())
            .field("kind", &kind)
            .finish()
    }
}

impl From<MemorySource> for SourceHandle {
    fn from(source: MemorySource) -> Self {
        Self::read_write(source)
    }
}

impl From<Arc<MemorySource>> for SourceHandle {
    fn from(source: Arc<MemorySource>) -> Self {
        Self::ReadWrite(source)
    }
}

impl From<EnvSource> for SourceHandle {
    fn from(source: EnvSource) -> Self {
        Self::read_only(source)
    }
}

impl From<FileSource> for SourceHandle {
    fn from(source: FileSource) -> Self {
        Self::read_only(source)
    }
}

impl From<Arc<FileSource>> for SourceHandle {
    fn from(source: Arc<FileSource>) -> Self {
        Self::ReadOnly(source)
    }
}
