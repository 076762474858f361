//! Dynamic configuration values.
//!
//! Values are `serde_json::Value` trees. A missing value is `None`; a JSON
//! `null` is a present value that `get_required` still rejects.

pub use serde_json::{Map, Value};

/// Walk a value tree by segments.
///
/// Objects are indexed by key and arrays by numeric segment. Returns `None`
/// as soon as a segment is absent or the current node is a scalar.
pub fn lookup<'a, S: AsRef<str>>(value: &'a Value, segments: &[S]) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        let segment = segment.as_ref();
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a value at a nested path, creating intermediate objects as needed.
///
/// Arrays are indexed in place when the segment is a numeric index; an index
/// past the end grows the array, padding the gap with `null`. Other
/// intermediate nodes that are not objects are replaced by empty objects.
/// An empty path replaces the root.
pub fn insert<S: AsRef<str>>(root: &mut Value, segments: &[S], new_value: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        *root = new_value;
        return;
    };

    let mut current = root;
    for segment in parents {
        current = child_mut(current, segment.as_ref());
    }

    *slot_mut(current, leaf.as_ref()) = new_value;
}

/// Descend one level for writing, materialising an object in empty slots
fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let child = slot_mut(node, segment);
    if child.is_null() {
        *child = Value::Object(Map::new());
    }
    child
}

/// Slot addressed by `segment`, growing arrays or turning scalars into objects
fn slot_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match node {
        Value::Array(_) => segment.parse::<usize>().ok(),
        _ => None,
    };

    if index.is_none() && !node.is_object() {
        *node = Value::Object(Map::new());
    }

    match (node, index) {
        (Value::Array(items), Some(index)) => {
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        },
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        _ => unreachable!("node is an indexable array or an object"),
    }
}
