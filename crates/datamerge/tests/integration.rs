//! End-to-end aggregation over real pack directories.

use datamerge::{
    DataLoadError, EntryError, Identifier, LatestData, LoaderConfig, MultiJsonLoader, PackStack,
    load_merge_config,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ===========================================================================
// Helpers
// ===========================================================================

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Two packs, `a` and `b`, under one temp directory.
fn two_packs() -> (TempDir, PackStack) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();

    let mut stack = PackStack::new();
    stack.push("a", dir.path().join("a")).unwrap();
    stack.push("b", dir.path().join("b")).unwrap();
    (dir, stack)
}

fn id(s: &str) -> Identifier {
    s.parse().unwrap()
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn both_packs_contribute_to_shared_identifier() {
    let (dir, stack) = two_packs();
    write(dir.path(), "a/data/ns/powers/foo.json", r#"{"v":1}"#);
    write(dir.path(), "b/data/ns/powers/foo.json", r#"{"v":2}"#);

    let data = MultiJsonLoader::new("powers").aggregate(&stack);

    let values = data.get(&id("ns:foo")).unwrap();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&json!({"v": 1})));
    assert!(values.contains(&json!({"v": 2})));
}

#[test]
fn malformed_file_drops_only_its_identifier() {
    let (dir, stack) = two_packs();
    write(dir.path(), "a/data/ns/powers/bar.json", "{ this is not json");
    write(dir.path(), "a/data/ns/powers/foo.json", r#"{"v":1}"#);
    write(dir.path(), "b/data/other/powers/baz.json", "[]");

    let report = MultiJsonLoader::new("powers").aggregate_with_report(&stack);

    assert!(!report.data.contains(&id("ns:bar")));
    assert!(report.data.contains(&id("ns:foo")));
    assert!(report.data.contains(&id("other:baz")));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].source, id("ns:powers/bar.json"));
    assert!(matches!(report.skipped[0].error, EntryError::Parse { .. }));
}

#[test]
fn empty_file_is_skipped() {
    let (dir, stack) = two_packs();
    write(dir.path(), "a/data/ns/powers/foo.json", "");
    write(dir.path(), "b/data/ns/powers/foo.json", r#"{"v":2}"#);

    let report = MultiJsonLoader::new("powers").aggregate_with_report(&stack);

    assert_eq!(report.data.get(&id("ns:foo")).unwrap(), &[json!({"v": 2})]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].pack.as_deref(), Some("a"));
    assert!(matches!(report.skipped[0].error, EntryError::EmptyDocument));
}

#[test]
fn other_types_and_extensions_are_ignored() {
    let (dir, stack) = two_packs();
    write(dir.path(), "a/data/ns/powers/foo.json", "1");
    write(dir.path(), "a/data/ns/powers/foo.json.bak", "2");
    write(dir.path(), "a/data/ns/origins/foo.json", "3");
    write(dir.path(), "a/data/ns/powers/deep/er/bar.json", "4");

    let data = MultiJsonLoader::new("powers").aggregate(&stack);

    let ids: Vec<_> = data.ids().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["ns:deep/er/bar", "ns:foo"]);
    assert_eq!(data.get(&id("ns:foo")).unwrap(), &[json!(1)]);
}

#[test]
fn nested_resource_type() {
    let (dir, stack) = two_packs();
    write(dir.path(), "a/data/ns/origin_layers/core/main.json", "{}");

    let data = MultiJsonLoader::new("origin_layers/core").aggregate(&stack);
    assert!(data.contains(&id("ns:main")));
}

#[test]
fn reload_picks_up_changes() {
    let (dir, stack) = two_packs();
    write(dir.path(), "a/data/ns/powers/foo.json", "1");

    let loader = MultiJsonLoader::new("powers");
    let mut latest = LatestData::new();
    loader.reload(&stack, &mut latest);
    assert_eq!(latest.data().get(&id("ns:foo")).unwrap(), &[json!(1)]);

    fs::remove_file(dir.path().join("a/data/ns/powers/foo.json")).unwrap();
    write(dir.path(), "b/data/ns/powers/bar.json", "2");
    loader.reload(&stack, &mut latest);

    assert_eq!(latest.reloads(), 2);
    assert!(!latest.data().contains(&id("ns:foo")));
    assert_eq!(latest.data().get(&id("ns:bar")).unwrap(), &[json!(2)]);
}

// ===========================================================================
// Configuration
// ===========================================================================

#[test]
fn config_file_drives_aggregation() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "packs/base/data/ns/powers/foo.json", r#"{"v":1}"#);
    write(dir.path(), "packs/addon/data/ns/powers/foo.json", r#"{"v":2}"#);
    write(dir.path(), "packs/addon/data/ns/badges/star.badge", r#"{"icon":"star"}"#);
    write(
        dir.path(),
        "merge.ron",
        r#"(
            packs: [
                (name: "base", path: "packs/base"),
                (name: "addon", path: "packs/addon"),
            ],
            loaders: [
                (resource_type: "powers"),
                (resource_type: "badges", suffix: ".badge"),
            ],
        )"#,
    );

    let config = load_merge_config(&dir.path().join("merge.ron")).unwrap();
    let stack = config.pack_stack().unwrap();
    assert_eq!(stack.len(), 2);

    let powers = config.loaders[0].build().aggregate(&stack);
    assert_eq!(powers.get(&id("ns:foo")).unwrap().len(), 2);

    let badges = config.loaders[1].build().aggregate(&stack);
    assert_eq!(
        badges.get(&id("ns:star")).unwrap(),
        &[json!({"icon": "star"})]
    );
}

#[test]
fn config_with_duplicate_pack_names_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("p")).unwrap();
    write(
        dir.path(),
        "merge.json",
        r#"{"packs": [{"name": "p", "path": "p"}, {"name": "p", "path": "p"}],
            "loaders": [{"resource_type": "powers"}]}"#,
    );

    let config = load_merge_config(&dir.path().join("merge.json")).unwrap();
    assert!(matches!(
        config.pack_stack(),
        Err(DataLoadError::DuplicatePack { .. })
    ));
    assert_eq!(config.loaders[0], LoaderConfig::new("powers"));
}
