//! Unit tests for the settings registry

use super::*;
use crate::options::DEFAULT_PROFILE;
use crate::source::{EnvCase, EnvSourceOptions, FileSource, Source, WritableSource};
use camino::Utf8PathBuf;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("strata_config=trace")
        .with_test_writer()
        .try_init();
}

/// Settings with no built-in sources
fn bare() -> Settings {
    Settings::with_environment(SettingsOptions::empty(), Vec::<(String, String)>::new()).unwrap()
}

fn memory(name: &str, data: Value) -> MemorySource {
    MemorySource::with_name(name, data)
}

/// Read-only source that counts lookups
struct CountingSource {
    name: String,
    value: Option<Value>,
    calls: Arc<AtomicUsize>,
}

impl CountingSource {
    fn new(name: &str, value: Option<Value>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            name: name.to_string(),
            value,
            calls: calls.clone(),
        };
        (source, calls)
    }
}

impl Source for CountingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, _path: &KeyPath) -> StrataResult<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

/// Writable source whose writes always fail
struct FailingWriter;

impl Source for FailingWriter {
    fn name(&self) -> &str {
        "failing"
    }

    fn get(&self, _path: &KeyPath) -> StrataResult<Option<Value>> {
        Ok(None)
    }
}

impl WritableSource for FailingWriter {
    fn set(&self, _path: &KeyPath, _value: Value) -> StrataResult<()> {
        Err(StrataError::io(
            "store is read-only".to_string(),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        ))
    }
}

#[test]
fn test_default_construction() {
    let settings =
        Settings::with_environment(SettingsOptions::default(), [("APP__NAME", "strata")]).unwrap();

    assert_eq!(settings.profile(), DEFAULT_PROFILE);
    assert_eq!(settings.count(None), 2);
    assert_eq!(settings.count(Some(DEFAULT_PROFILE)), 2);

    let registered: Vec<(i64, &str)> = settings
        .sources()
        .map(|entry| (entry.priority(), entry.source().name()))
        .collect();
    assert_eq!(registered, vec![(1, "memory"), (5, "env")]);
}

#[test]
fn test_memory_scenario() {
    let mut settings = bare();
    settings
        .add_source(memory("memory", json!({ "a": { "b": 5 } })), Registration::new())
        .unwrap();

    assert_eq!(settings.get("a.b").unwrap(), Some(json!(5)));
    assert_eq!(settings.get_or("a.c", "fallback").unwrap(), json!("fallback"));
    assert_eq!(settings.get("a.c").unwrap(), None);
}

#[test]
fn test_env_scenario() {
    let settings = Settings::with_environment(
        SettingsOptions {
            default_memo_source: false,
            ..SettingsOptions::default()
        },
        [("FOO__BAR", "1")],
    )
    .unwrap();

    assert_eq!(settings.get("foo.bar").unwrap(), Some(json!("1")));
    assert_eq!(settings.get("foo").unwrap(), Some(json!({ "BAR": "1" })));
}

#[test]
fn test_memory_shadows_env_by_priority() {
    let settings =
        Settings::with_environment(SettingsOptions::default(), [("DB__HOST", "from-env")]).unwrap();

    assert_eq!(settings.get("db.host").unwrap(), Some(json!("from-env")));

    settings.set("db.host", "from-memory").unwrap();
    assert_eq!(settings.get("db.host").unwrap(), Some(json!("from-memory")));
}

#[test]
fn test_lower_priority_number_wins() {
    let mut settings = bare();
    settings
        .add_source(
            memory("late", json!({ "key": "late" })),
            Registration::new().with_priority(10),
        )
        .unwrap();
    settings
        .add_source(
            memory("early", json!({ "key": "early" })),
            Registration::new().with_priority(2),
        )
        .unwrap();

    assert_eq!(settings.get("key").unwrap(), Some(json!("early")));
}

#[test]
fn test_first_defined_value_stops_lookup() {
    init_tracing();
    let mut settings = bare();
    let (first, first_calls) = CountingSource::new("first", None);
    let (second, second_calls) = CountingSource::new("second", Some(json!("hit")));
    let (third, third_calls) = CountingSource::new("third", Some(json!("shadowed")));

    settings.add_source(SourceHandle::read_only(first), Registration::new()).unwrap();
    settings.add_source(SourceHandle::read_only(second), Registration::new()).unwrap();
    settings.add_source(SourceHandle::read_only(third), Registration::new()).unwrap();

    assert_eq!(settings.get("anything").unwrap(), Some(json!("hit")));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(third_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_default_priority_follows_highest() {
    let mut settings = bare();
    settings
        .add_source(memory("a", json!({})), Registration::new().with_priority(7))
        .unwrap();
    settings.add_source(memory("b", json!({})), Registration::new()).unwrap();
    settings.add_source(memory("c", json!({})), Registration::new()).unwrap();

    let priorities: Vec<i64> = settings.sources().map(RegisteredSource::priority).collect();
    assert_eq!(priorities, vec![7, 8, 9]);
}

#[test]
fn test_equal_priorities_keep_registration_order() {
    let mut settings = bare();
    for name in ["one", "two", "three"] {
        settings
            .add_source(
                memory(name, json!({ "who": name })),
                Registration::new().with_priority(3),
            )
            .unwrap();
    }

    let names: Vec<&str> = settings.sources().map(|entry| entry.source().name()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert_eq!(settings.get("who").unwrap(), Some(json!("one")));
}

#[test]
fn test_reserved_profile_rejected() {
    let mut settings = bare();
    let result = settings.add_source(
        memory("memory", json!({})),
        Registration::new().with_profile(TOTAL),
    );

    assert!(matches!(result, Err(StrataError::ReservedProfileName { .. })));
    assert_eq!(settings.count(None), 0);
}

#[test]
fn test_reserved_profile_in_options() {
    let result = Settings::with_environment(
        SettingsOptions::default().with_profile(TOTAL),
        Vec::<(String, String)>::new(),
    );

    assert!(matches!(result, Err(StrataError::ReservedProfileName { .. })));
}

#[test]
fn test_duplicate_name_rejected() {
    let mut settings = bare();
    settings
        .add_source(memory("shared", json!({})), Registration::new().with_profile("dev"))
        .unwrap();

    let result = settings.add_source(
        memory("shared", json!({})),
        Registration::new().with_profile("dev"),
    );
    match result {
        Err(StrataError::DuplicateSourceName { name, profile }) => {
            assert_eq!(name, "shared");
            assert_eq!(profile, "dev");
        },
        other => panic!("expected duplicate name error, got {:?}", other),
    }

    // Counters are untouched by the rejected registration
    assert_eq!(settings.count(Some("dev")), 1);
    assert_eq!(settings.count(None), 1);

    // Same name under another profile is fine
    settings
        .add_source(memory("shared", json!({})), Registration::new().with_profile("prod"))
        .unwrap();
    assert_eq!(settings.count(None), 2);
}

#[test]
fn test_empty_names_rejected() {
    let mut settings = bare();

    let result = settings.add_source(memory("", json!({})), Registration::new());
    assert!(matches!(result, Err(StrataError::InvalidArguments { .. })));

    let result = settings.add_source(memory("m", json!({})), Registration::new().with_profile(""));
    assert!(matches!(result, Err(StrataError::InvalidArguments { .. })));
}

#[test]
fn test_counters() {
    let mut settings = bare();
    settings
        .add_source(memory("a", json!({})), Registration::new().with_profile("dev"))
        .unwrap();
    settings
        .add_source(memory("b", json!({})), Registration::new().with_profile("dev"))
        .unwrap();
    settings
        .add_source(memory("a", json!({})), Registration::new().with_profile("prod"))
        .unwrap();

    assert_eq!(settings.count(Some("dev")), 2);
    assert_eq!(settings.count(Some("prod")), 1);
    assert_eq!(settings.count(Some("staging")), 0);
    assert_eq!(settings.count(None), 3);
    assert_eq!(settings.count(Some(TOTAL)), 3);
    assert_eq!(settings.profiles().collect::<Vec<_>>(), vec!["dev", "prod"]);
}

#[test]
fn test_profiles_partition_sources() {
    let mut settings = bare();
    settings
        .add_source(
            memory("memory", json!({ "db": { "host": "dev-db" } })),
            Registration::new().with_profile("dev"),
        )
        .unwrap();
    settings
        .add_source(
            memory("memory", json!({ "db": { "host": "prod-db" } })),
            Registration::new().with_profile("prod"),
        )
        .unwrap();

    settings.change_profile("dev");
    assert_eq!(settings.get("db.host").unwrap(), Some(json!("dev-db")));

    settings.change_profile("prod");
    assert_eq!(settings.profile(), "prod");
    assert_eq!(settings.get("db.host").unwrap(), Some(json!("prod-db")));
}

#[test]
fn test_registration_defaults_to_active_profile() {
    let mut settings = bare();
    settings.change_profile("qa");
    settings.add_source(memory("memory", json!({ "x": 1 })), Registration::new()).unwrap();

    assert_eq!(settings.count(Some("qa")), 1);
    assert_eq!(settings.get("x").unwrap(), Some(json!(1)));
}

#[test]
fn test_empty_profile_falls_through_to_default() {
    let mut settings =
        Settings::with_environment(SettingsOptions::default(), [("A__B", "1")]).unwrap();
    settings.set("a.b", 10).unwrap();

    settings.change_profile("nothing-here");
    assert_eq!(settings.get("a.b").unwrap(), None);
    assert_eq!(settings.get_or("a.b", 42).unwrap(), json!(42));
}

#[test]
fn test_get_is_idempotent() {
    let settings =
        Settings::with_environment(SettingsOptions::default(), [("PORT", "8080")]).unwrap();

    let first = settings.get("port").unwrap();
    let second = settings.get("port").unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Some(json!("8080")));
}

#[test]
fn test_get_required() {
    let mut settings = bare();
    settings
        .add_source(
            memory("memory", json!({ "present": "yes", "nothing": null })),
            Registration::new(),
        )
        .unwrap();

    assert_eq!(settings.get_required("present").unwrap(), json!("yes"));
    assert!(matches!(
        settings.get_required("absent"),
        Err(StrataError::MissingRequiredSetting { .. })
    ));
    assert!(matches!(
        settings.get_required("nothing"),
        Err(StrataError::MissingRequiredSetting { .. })
    ));

    assert_eq!(settings.get_required_or("absent", "fallback").unwrap(), json!("fallback"));
    assert!(matches!(
        settings.get_required_or("absent", Value::Null),
        Err(StrataError::MissingRequiredSetting { key }) if key == "absent"
    ));
}

#[test]
fn test_set_fans_out_to_writable_sources() {
    let mut settings = bare();
    let first = Arc::new(memory("first", json!({})));
    let second = Arc::new(memory("second", json!({})));
    let other_profile = Arc::new(memory("other", json!({})));

    settings.add_source(first.clone(), Registration::new()).unwrap();
    settings.add_source(second.clone(), Registration::new()).unwrap();
    settings
        .add_source(EnvSource::new([("A__B", "env")]), Registration::new().with_priority(0))
        .unwrap();
    settings
        .add_source(other_profile.clone(), Registration::new().with_profile("elsewhere"))
        .unwrap();

    settings.set("a.b", 10).unwrap();

    assert_eq!(first.snapshot(), json!({ "a": { "b": 10 } }));
    assert_eq!(second.snapshot(), json!({ "a": { "b": 10 } }));
    assert_eq!(other_profile.snapshot(), json!({}));

    // The read-only env source still wins on priority
    assert_eq!(settings.get("a.b").unwrap(), Some(json!("env")));
}

#[test]
fn test_set_past_array_end_keeps_elements() {
    let mut settings = bare();
    settings.add_source(memory("memory", json!({})), Registration::new()).unwrap();

    settings.set("list", json!([1, 2])).unwrap();
    settings.set("list[5]", 9).unwrap();

    assert_eq!(settings.get("list").unwrap(), Some(json!([1, 2, null, null, null, 9])));
    assert_eq!(settings.get("list[1]").unwrap(), Some(json!(2)));
}

#[test]
fn test_set_without_writable_source() {
    let mut settings = bare();
    settings
        .add_source(EnvSource::new([("A__B", "1")]), Registration::new())
        .unwrap();

    match settings.set("a.b", 10) {
        Err(StrataError::NoWritableSource { profile }) => assert_eq!(profile, DEFAULT_PROFILE),
        other => panic!("expected no writable source error, got {:?}", other),
    }
}

#[test]
fn test_set_propagates_source_failure() {
    init_tracing();
    let mut settings = bare();
    settings
        .add_source(SourceHandle::read_write(FailingWriter), Registration::new())
        .unwrap();

    assert!(matches!(settings.set("a", 1), Err(StrataError::Io { .. })));
}

#[test]
fn test_source_errors_propagate_from_get() {
    let dir = TempDir::new().unwrap();
    let missing = Utf8PathBuf::try_from(dir.path().join("missing.json")).unwrap();

    let mut settings = bare();
    settings
        .add_source(FileSource::new(missing).unwrap(), Registration::new())
        .unwrap();

    assert!(matches!(settings.get("a"), Err(StrataError::Io { .. })));
}

#[test]
fn test_file_source_layered_under_memory() {
    let dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(dir.path().join("defaults.toml")).unwrap();
    std::fs::write(&path, "[server]\nport = 80\nhost = \"0.0.0.0\"\n").unwrap();

    let mut settings =
        Settings::with_environment(SettingsOptions::default(), Vec::<(String, String)>::new())
            .unwrap();
    settings
        .add_source(FileSource::with_name("defaults", path).unwrap(), Registration::new())
        .unwrap();

    settings.set("server.port", 8080).unwrap();
    assert_eq!(settings.get("server.port").unwrap(), Some(json!(8080)));
    assert_eq!(settings.get("server[host]").unwrap(), Some(json!("0.0.0.0")));
}

#[test]
fn test_reference_values_are_resolved() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("mod.json"),
        r#"{ "prop": { "nested": true }, "name": "module" }"#,
    )
    .unwrap();
    let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

    let settings = Settings::with_environment(
        SettingsOptions::default().with_reference_base(base),
        Vec::<(String, String)>::new(),
    )
    .unwrap();

    settings.set("whole", "${ref=./mod}").unwrap();
    settings.set("part", "${ref=./mod#prop}").unwrap();
    settings.set("absent", "${ref=./mod#nope}").unwrap();
    settings.set("broken", "${ref=./missing}").unwrap();

    assert_eq!(
        settings.get("whole").unwrap(),
        Some(json!({ "prop": { "nested": true }, "name": "module" }))
    );
    assert_eq!(settings.get("part").unwrap(), Some(json!({ "nested": true })));
    assert_eq!(settings.get("absent").unwrap(), None);
    assert_eq!(settings.get_or("absent", "fallback").unwrap(), json!("fallback"));
    assert!(matches!(
        settings.get("broken"),
        Err(StrataError::ResolverLoadFailure { .. })
    ));
}

#[test]
fn test_references_left_alone_without_resolver() {
    let settings =
        Settings::with_environment(SettingsOptions::default(), [("LINK", "${ref=./mod}")]).unwrap();

    assert_eq!(settings.get("link").unwrap(), Some(json!("${ref=./mod}")));
}

#[test]
fn test_custom_env_source_registration() {
    let mut settings = bare();
    let env = EnvSource::with_options(
        [("app_db_host", "lower")],
        EnvSourceOptions {
            name: "app-env".to_string(),
            prefix: Some("APP".to_string()),
            separator: "_".to_string(),
            case: EnvCase::Lower,
        },
    )
    .unwrap();
    settings.add_source(env, Registration::new()).unwrap();

    assert_eq!(settings.get("db.host").unwrap(), Some(json!("lower")));
}
