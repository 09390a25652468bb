//! Backup creation, enumeration, and restore

mod common;

use common::TestFixture;
use layerconf::{ConfigValue, Scope, SetOptions};
use serde_json::json;

#[test]
fn create_backup_with_explicit_and_generated_names() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.set("ui.theme", "dark"));

    let named = fixture.manager.backup().create(Some("before-upgrade")).unwrap();
    assert!(named.ends_with("before-upgrade.json"));
    assert!(named.exists());

    let generated = fixture.manager.backup().create(None).unwrap();
    assert!(generated.exists());
    assert!(
        generated
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("backup-"))
    );
}

#[test]
fn restore_round_trips_scopes_and_profiles() {
    let fixture = TestFixture::new();

    assert!(fixture
        .manager
        .set_with("app.locale", "de-DE", SetOptions::default().scope(Scope::Global)));
    assert!(fixture.manager.set("ui.theme", "dark"));
    let id = fixture
        .manager
        .create_profile("Snapshot", "", Some(ConfigValue::from(json!({"p": 1.0}))))
        .unwrap();
    assert!(fixture.manager.activate_profile(&id));

    let snapshot = fixture.manager.backup().create(Some("checkpoint")).unwrap();

    // Diverge from the snapshot
    assert!(fixture.manager.set("ui.theme", "light"));
    assert!(fixture.manager.reset_to_defaults(Scope::Global));
    assert!(fixture.manager.delete_profile(&id));

    assert!(fixture.manager.backup().restore(&snapshot));
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
    assert_eq!(
        fixture.manager.get("app.locale").and_then(|v| v.as_str().map(String::from)),
        Some("de-DE".to_string())
    );
    assert_eq!(fixture.manager.active_profile().map(|p| p.id), Some(id));

    // Restored state is persisted, not just in memory
    let fixture = fixture.reopen();
    assert_eq!(
        fixture.manager.get("app.locale").and_then(|v| v.as_str().map(String::from)),
        Some("de-DE".to_string())
    );
}

#[test]
fn restore_from_unreadable_file_leaves_state_untouched() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.set("ui.theme", "dark"));

    let missing = fixture.temp_dir.path().join("backups/no-such.json");
    assert!(!fixture.manager.backup().restore(&missing));

    let corrupt = fixture.temp_dir.path().join("backups/corrupt.json");
    std::fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
    std::fs::write(&corrupt, "{not json").unwrap();
    assert!(!fixture.manager.backup().restore(&corrupt));

    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
}

#[test]
fn list_skips_corrupt_files_and_sorts_newest_first() {
    let fixture = TestFixture::new();

    fixture.manager.backup().create(Some("first")).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(10));
    fixture.manager.backup().create(Some("second")).unwrap();
    std::fs::write(
        fixture.temp_dir.path().join("backups/garbage.json"),
        "not a backup",
    )
    .unwrap();

    let listed = fixture.manager.backup().list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "second");
    assert_eq!(listed[1].name, "first");
    assert!(listed[0].created_at >= listed[1].created_at);
}

#[test]
fn delete_removes_the_file() {
    let fixture = TestFixture::new();

    let path = fixture.manager.backup().create(Some("doomed")).unwrap();
    assert!(fixture.manager.backup().delete(&path));
    assert!(!path.exists());
    assert!(fixture.manager.backup().list().is_empty());

    assert!(!fixture.manager.backup().delete(&path));
}
