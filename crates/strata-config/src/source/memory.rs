//! In-memory source backed by a value tree

use parking_lot::RwLock;
use strata_core::types::value;
use strata_core::{KeyPath, StrataResult, Value};

use super::{Source, WritableSource};

/// Default name of the memory source
pub const MEMORY_SOURCE_NAME: &str = "memory";

/// Writable source holding settings in memory
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    data: RwLock<Value>,
}

impl MemorySource {
    /// Create a memory source seeded with `data`
    pub fn new(data: Value) -> Self {
        Self::with_name(MEMORY_SOURCE_NAME, data)
    }

    /// Create a memory source with a custom name
    pub fn with_name(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data: RwLock::new(data),
        }
    }

    /// Copy of the whole value tree
    pub fn snapshot(&self) -> Value {
        self.data.read().clone()
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl Source for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, path: &KeyPath) -> StrataResult<Option<Value>> {
        let data = self.data.read();
        Ok(value::lookup(&data, path.segments()).cloned())
    }
}

impl WritableSource for MemorySource {
    fn set(&self, path: &KeyPath, new_value: Value) -> StrataResult<()> {
        let mut data = self.data.write();
        value::insert(&mut data, path.segments(), new_value);
        Ok(())
    }
}
