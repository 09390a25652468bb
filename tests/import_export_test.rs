//! Export and import of the persisted scopes

mod common;

use common::TestFixture;
use layerconf::{Scope, SetOptions};
use serde_json::Value;

#[test]
fn export_then_replace_import_restores_both_scopes() {
    let fixture = TestFixture::new();

    assert!(fixture
        .manager
        .set_with("app.locale", "fr-FR", SetOptions::default().scope(Scope::Global)));
    assert!(fixture.manager.set("ui.theme", "dark"));

    let export = fixture.temp_dir.path().join("export.json");
    assert!(fixture.manager.export_configuration(&export, false));

    assert!(fixture.manager.reset_to_defaults(Scope::Global));
    assert!(fixture.manager.reset_to_defaults(Scope::User));
    assert!(fixture.manager.get("ui.theme").is_none());

    assert!(fixture.manager.import_configuration(&export, false));
    assert_eq!(
        fixture.manager.get("app.locale").and_then(|v| v.as_str().map(String::from)),
        Some("fr-FR".to_string())
    );
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
}

#[test]
fn merge_import_is_a_shallow_top_level_update() {
    let fixture = TestFixture::new();

    // Export a tree holding only a "ui" section
    assert!(fixture.manager.set("ui.theme", "dark"));
    let export = fixture.temp_dir.path().join("export.json");
    assert!(fixture.manager.export_configuration(&export, false));

    // Diverge: a sibling section and a nested addition under "ui"
    assert!(fixture.manager.set("net.proxy", "socks5://localhost"));
    assert!(fixture.manager.set("ui.zoom", 2));

    assert!(fixture.manager.import_configuration(&export, true));

    // Untouched top-level section survives
    assert_eq!(
        fixture.manager.get("net.proxy").and_then(|v| v.as_str().map(String::from)),
        Some("socks5://localhost".to_string())
    );
    // The imported "ui" section replaces the existing one wholesale
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
    assert!(fixture.manager.get("ui.zoom").is_none());
}

#[test]
fn replace_import_drops_keys_absent_from_the_document() {
    let fixture = TestFixture::new();

    assert!(fixture.manager.set("ui.theme", "dark"));
    let export = fixture.temp_dir.path().join("export.json");
    assert!(fixture.manager.export_configuration(&export, false));

    assert!(fixture.manager.set("net.proxy", "socks5://localhost"));
    assert!(fixture.manager.import_configuration(&export, false));

    assert!(fixture.manager.get("net.proxy").is_none());
}

#[test]
fn export_document_carries_profiles_when_requested() {
    let fixture = TestFixture::new();

    let id = fixture.manager.create_profile("Bundle", "", None).unwrap();
    assert!(fixture.manager.activate_profile(&id));

    let with = fixture.temp_dir.path().join("with-profiles.json");
    let without = fixture.temp_dir.path().join("without-profiles.json");
    assert!(fixture.manager.export_configuration(&with, true));
    assert!(fixture.manager.export_configuration(&without, false));

    let doc: Value =
        serde_json::from_str(&std::fs::read_to_string(&with).unwrap()).unwrap();
    assert_eq!(doc["profiles"].as_array().map(Vec::len), Some(1));
    assert_eq!(doc["active_profile_id"].as_str(), Some(id.as_str()));
    assert!(doc["export_timestamp"].is_string());
    assert!(doc["version"].is_string());

    let doc: Value =
        serde_json::from_str(&std::fs::read_to_string(&without).unwrap()).unwrap();
    assert!(doc.get("profiles").is_none());
}

#[test]
fn import_failure_leaves_state_untouched() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.set("ui.theme", "dark"));

    let missing = fixture.temp_dir.path().join("no-such.json");
    assert!(!fixture.manager.import_configuration(&missing, false));

    let corrupt = fixture.temp_dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "][").unwrap();
    assert!(!fixture.manager.import_configuration(&corrupt, true));

    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
}
