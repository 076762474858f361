//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use serde_json::{json, Map, Value};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Nested document `depth` levels deep ending in `{"leaf": <depth>}`
pub fn nested_document(depth: usize) -> Value {
    (0..depth).rev().fold(json!({ "leaf": depth }), |inner, level| {
        let mut map = Map::new();
        map.insert(format!("level{}", level), inner);
        Value::Object(map)
    })
}

/// Dotted key addressing the leaf of [`nested_document`]
pub fn nested_key(depth: usize) -> String {
    let mut segments: Vec<String> = (0..depth).map(|level| format!("level{}", level)).collect();
    segments.push("leaf".to_string());
    segments.join(".")
}
