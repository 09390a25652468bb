//! Profile lifecycle, exclusivity, and fallback resolution

mod common;

use common::TestFixture;
use layerconf::{ConfigValue, Scope, SetOptions};
use serde_json::json;

#[test]
fn create_and_list_profiles() {
    let fixture = TestFixture::new();

    let id_a = fixture
        .manager
        .create_profile("Work", "Office defaults", None)
        .unwrap();
    let id_b = fixture
        .manager
        .create_profile("Home", "", None)
        .unwrap();
    assert_ne!(id_a, id_b);

    let listed = fixture.manager.list_profiles();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Work");
    assert_eq!(listed[1].name, "Home");
    assert!(fixture.manager.get_profile(&id_a).is_some());
    assert!(fixture.manager.active_profile().is_none());
}

#[test]
fn activation_is_exclusive() {
    let fixture = TestFixture::new();

    let id_a = fixture.manager.create_profile("A", "", None).unwrap();
    let id_b = fixture.manager.create_profile("B", "", None).unwrap();

    assert!(fixture.manager.activate_profile(&id_a));
    assert_eq!(fixture.manager.active_profile().map(|p| p.id), Some(id_a));

    assert!(fixture.manager.activate_profile(&id_b));
    assert_eq!(fixture.manager.active_profile().map(|p| p.id), Some(id_b));

    assert!(!fixture.manager.activate_profile("no-such-id"));
}

#[test]
fn active_profile_is_the_lowest_resolution_layer() {
    let fixture = TestFixture::new();

    let settings = ConfigValue::from(json!({"ui": {"theme": "solarized", "zoom": 1.5}}));
    let id = fixture
        .manager
        .create_profile("Custom", "", Some(settings))
        .unwrap();
    assert!(fixture.manager.activate_profile(&id));

    // Profile supplies keys no scope holds
    assert_eq!(
        fixture.manager.get("ui.zoom").and_then(|v| v.as_f64()),
        Some(1.5)
    );

    // Any scope value shadows the profile
    assert!(fixture.manager.set_with(
        "ui.theme",
        "dark",
        SetOptions::default().scope(Scope::Temporary).in_memory(),
    ));
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
}

#[test]
fn activation_switch_invalidates_cached_resolutions() {
    let fixture = TestFixture::new();

    let id_a = fixture
        .manager
        .create_profile("A", "", Some(ConfigValue::from(json!({"ui": {"theme": "light"}}))))
        .unwrap();
    let id_b = fixture
        .manager
        .create_profile("B", "", Some(ConfigValue::from(json!({"ui": {"theme": "dark"}}))))
        .unwrap();

    assert!(fixture.manager.activate_profile(&id_a));
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("light".to_string())
    );

    assert!(fixture.manager.activate_profile(&id_b));
    assert_eq!(
        fixture.manager.get("ui.theme").and_then(|v| v.as_str().map(String::from)),
        Some("dark".to_string())
    );
}

#[test]
fn deleting_the_active_profile_clears_the_selection() {
    let fixture = TestFixture::new();

    let id = fixture
        .manager
        .create_profile("Doomed", "", Some(ConfigValue::from(json!({"k": 1.0}))))
        .unwrap();
    assert!(fixture.manager.activate_profile(&id));
    assert!(fixture.manager.get("k").is_some());

    assert!(fixture.manager.delete_profile(&id));
    assert!(fixture.manager.active_profile().is_none());
    assert!(fixture.manager.get("k").is_none());
    assert!(!fixture.manager.delete_profile(&id));
}

#[test]
fn update_profile_settings_stamps_and_takes_effect() {
    let fixture = TestFixture::new();

    let id = fixture.manager.create_profile("P", "", None).unwrap();
    let created = fixture.manager.get_profile(&id).unwrap();
    assert!(fixture.manager.activate_profile(&id));

    assert!(fixture
        .manager
        .update_profile_settings(&id, ConfigValue::from(json!({"ui": {"zoom": 2.0}}))));
    assert_eq!(
        fixture.manager.get("ui.zoom").and_then(|v| v.as_f64()),
        Some(2.0)
    );
    let updated = fixture.manager.get_profile(&id).unwrap();
    assert!(updated.last_modified >= created.last_modified);

    assert!(!fixture
        .manager
        .update_profile_settings("no-such-id", ConfigValue::object()));
}

#[test]
fn profiles_and_selection_survive_restart() {
    let fixture = TestFixture::new();

    let id = fixture
        .manager
        .create_profile("Persisted", "desc", Some(ConfigValue::from(json!({"a": true}))))
        .unwrap();
    assert!(fixture.manager.activate_profile(&id));

    let fixture = fixture.reopen();
    let profile = fixture.manager.active_profile().expect("selection persisted");
    assert_eq!(profile.id, id);
    assert_eq!(profile.name, "Persisted");
    assert_eq!(fixture.manager.get("a").and_then(|v| v.as_bool()), Some(true));
}
