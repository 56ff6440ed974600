use std::fs;

use inspector_core::db::{
    load_config, FilterPreset, InspectorConfig, WorkspaceContext, WorkspaceLayout,
};
use inspector_core::graph::NodeType;
use tempfile::tempdir;

fn write_config(layout: &WorkspaceLayout, config: &InspectorConfig) {
    fs::create_dir_all(&layout.meta_dir).expect("create meta dir");
    fs::write(&layout.config_path, serde_json::to_string_pretty(config).expect("serialize"))
        .expect("write config");
}

#[test]
fn layout_paths_are_derived_from_root() {
    let layout = WorkspaceLayout::new("/tmp/ws");
    assert!(layout.meta_dir.ends_with(".inspector"));
    assert!(layout.config_path.ends_with(".inspector/config.json"));
    assert!(layout.db_path.ends_with(".inspector/cache.db"));
    assert!(layout.graphs_dir.ends_with("graphs"));
    assert_eq!(
        layout.db_path_relative_string().replace('\\', "/"),
        ".inspector/cache.db"
    );
    assert!(layout.graph_export_path("0xab").ends_with("graphs/0xab.json"));
    assert!(layout.graph_meta_path("0xab").ends_with("graphs/0xab.meta.json"));
}

#[test]
fn config_round_trips_and_context_opens_cache() {
    let dir = tempdir().expect("tempdir");
    let layout = WorkspaceLayout::new(dir.path());
    let mut config = InspectorConfig::new("Tokens", layout.db_path_relative_string());
    config.show_only_filtered = true;
    write_config(&layout, &config);

    let loaded = load_config(&layout).expect("load config");
    assert_eq!(loaded, config);

    let ctx = WorkspaceContext::from_root(dir.path()).expect("context");
    assert_eq!(ctx.db_path, layout.db_path);
    assert!(ctx.db_path.exists());
    assert!(ctx.db.list_entries().expect("list").is_empty());
}

#[test]
fn missing_config_reports_path() {
    let dir = tempdir().expect("tempdir");
    let layout = WorkspaceLayout::new(dir.path());
    let err = load_config(&layout).unwrap_err();
    assert!(err.to_string().contains("Failed to read workspace config"));
}

#[test]
fn old_config_without_toggle_defaults_to_false() {
    let dir = tempdir().expect("tempdir");
    let layout = WorkspaceLayout::new(dir.path());
    fs::create_dir_all(&layout.meta_dir).expect("create meta dir");
    fs::write(
        &layout.config_path,
        r#"{ "name": "legacy", "config_version": "0.1.0", "cache": { "path": ".inspector/cache.db" } }"#,
    )
    .expect("write config");

    let loaded = load_config(&layout).expect("load config");
    assert!(!loaded.show_only_filtered);
    assert_eq!(loaded.description, None);
}

#[test]
fn presets_load_from_yaml_and_json() {
    let dir = tempdir().expect("tempdir");

    let yaml = dir.path().join("calls.yaml");
    fs::write(&yaml, "function: \"f()\"\ntype: calls\nshow_only_filtered: true\n")
        .expect("write yaml");
    let preset = FilterPreset::load(&yaml).expect("load yaml");
    assert_eq!(preset.function.as_deref(), Some("f()"));
    assert_eq!(preset.node_type, Some(NodeType::Calls));
    assert_eq!(preset.show_only_filtered, Some(true));
    assert_eq!(preset.filter().node_type, Some(NodeType::Calls));

    let json = dir.path().join("writes.json");
    fs::write(&json, r#"{ "type": "storageWrites" }"#).expect("write json");
    let preset = FilterPreset::load(&json).expect("load json");
    assert_eq!(preset.function, None);
    assert_eq!(preset.node_type, Some(NodeType::StorageWrites));
    assert_eq!(preset.show_only_filtered, None);
}

#[test]
fn presets_reject_unknown_formats_and_types() {
    let dir = tempdir().expect("tempdir");

    let toml = dir.path().join("preset.toml");
    fs::write(&toml, "type = 'calls'").expect("write toml");
    let err = FilterPreset::load(&toml).unwrap_err();
    assert!(err.to_string().contains("Unsupported preset format"));

    let bad = dir.path().join("bad.yml");
    fs::write(&bad, "type: selfdestruct\n").expect("write yml");
    assert!(FilterPreset::load(&bad).is_err());
}
