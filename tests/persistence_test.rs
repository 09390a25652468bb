//! Scope file persistence, corrupt-file tolerance, and load-time migration

mod common;

use common::TestFixture;
use layerconf::{Scope, SetOptions};
use serde_json::{Value, json};

#[test]
fn persistent_scopes_survive_restart_transient_scopes_do_not() {
    let fixture = TestFixture::new();

    assert!(fixture
        .manager
        .set_with("g.key", "global", SetOptions::default().scope(Scope::Global)));
    assert!(fixture.manager.set("u.key", "user"));
    assert!(fixture.manager.set_with(
        "s.key",
        "session",
        SetOptions::default().scope(Scope::Session).in_memory(),
    ));
    assert!(fixture.manager.set_with(
        "t.key",
        "temporary",
        SetOptions::default().scope(Scope::Temporary).in_memory(),
    ));

    let fixture = fixture.reopen();
    assert_eq!(
        fixture.manager.get("g.key").and_then(|v| v.as_str().map(String::from)),
        Some("global".to_string())
    );
    assert_eq!(
        fixture.manager.get("u.key").and_then(|v| v.as_str().map(String::from)),
        Some("user".to_string())
    );
    assert!(fixture.manager.get("s.key").is_none());
    assert!(fixture.manager.get("t.key").is_none());
}

#[test]
fn scope_files_hold_plain_trees() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.set("ui.theme", "dark"));

    let raw = fixture.read_file("user").expect("user scope persisted");
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["ui"]["theme"].as_str(), Some("dark"));
}

#[test]
fn corrupt_scope_file_degrades_to_an_empty_tree() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.set("ui.theme", "dark"));

    std::fs::write(fixture.file_path("user"), "{broken").unwrap();
    let fixture = fixture.reopen();

    assert!(fixture.manager.get("ui.theme").is_none());
    // Still fully usable afterwards
    assert!(fixture.manager.set("ui.theme", "light"));
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("light".to_string())
    );
}

#[test]
fn non_object_scope_file_degrades_to_an_empty_tree() {
    let fixture = TestFixture::new();
    std::fs::write(fixture.file_path("user"), "[1, 2, 3]").unwrap();

    let fixture = fixture.reopen();
    assert!(fixture.manager.get_scoped("0", Scope::User).is_none());
    assert!(fixture.manager.set("ui.theme", "dark"));
}

#[test]
fn stale_version_stamp_triggers_migration_at_load() {
    let fixture = TestFixture::new();
    std::fs::write(
        fixture.file_path("user"),
        serde_json::to_string(&json!({
            "system": {"version": "1.0.0"},
            "discovery": {"show_tips": false},
            "ui": {"theme": "dark"}
        }))
        .unwrap(),
    )
    .unwrap();

    let fixture = fixture.reopen();

    // Chain defaults added, existing values preserved, stamp advanced
    assert_eq!(
        fixture
            .manager
            .get("discovery.show_tutorials")
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        fixture.manager.get("discovery.show_tips").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(
        fixture
            .manager
            .get("accessibility.font_scale")
            .and_then(|v| v.as_f64()),
        Some(1.0)
    );
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );

    // Migrated tree is written back
    let raw = fixture.read_file("user").unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["system"]["version"].as_str(), Some("1.2.0"));
}

#[test]
fn unstamped_trees_are_left_alone() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.set("ui.theme", "dark"));

    let fixture = fixture.reopen();
    assert!(fixture.manager.get("discovery.show_tips").is_none());
    assert!(fixture.manager.get("system.version").is_none());
}

#[test]
fn unknown_version_stamp_keeps_the_loaded_tree() {
    let fixture = TestFixture::new();
    std::fs::write(
        fixture.file_path("user"),
        serde_json::to_string(&json!({
            "system": {"version": "0.9.0"},
            "ui": {"theme": "dark"}
        }))
        .unwrap(),
    )
    .unwrap();

    let fixture = fixture.reopen();
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
    assert_eq!(
        fixture
            .manager
            .get("system.version")
            .and_then(|v| v.as_str().map(String::from)),
        Some("0.9.0".to_string())
    );
}

#[test]
fn disabled_migrations_load_stamped_trees_verbatim() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("user.json"),
        serde_json::to_string(&json!({"system": {"version": "1.0.0"}})).unwrap(),
    )
    .unwrap();

    let manager = layerconf::ConfigurationManager::builder("test-app")
        .base_dir(temp_dir.path())
        .without_migrations()
        .build()
        .unwrap();

    assert!(manager.get("discovery.show_tips").is_none());
    assert_eq!(
        manager
            .get("system.version")
            .and_then(|v| v.as_str().map(String::from)),
        Some("1.0.0".to_string())
    );
}
