//! State store behavior against real backends.

use chrono::Utc;
use inv_model::{
    ActiveCustodian, AdditionalItem, Asset, AreaDirectoryEntry, Custodian, SessionState, Verifier,
};
use inv_persistence::{FileBackend, MemoryBackend, PersistenceError, SNAPSHOT_KEY, StateStore};
use tempfile::tempdir;

fn populated(store: &mut StateStore) {
    let state = store.state_mut();
    state.logged_in = true;
    state.current_user = Some(Verifier::new("41290", "AUDITOR"));
    state.session_start_time = Some(Utc::now());

    let mut located = Asset::new("12345");
    located.origin_area = "7".into();
    located.serial = "SN-1".into();
    located.locate("ANA", "8", Some("OFICINA 1".into()), Utc::now());
    state.inventory.push(located);
    state.inventory.push(Asset::new("0.5"));

    let mut item = AdditionalItem::new("MONITOR", "ANA");
    item.personal = true;
    item.serial = Some("XYZ".into());
    state.additional_items.push(item);

    let ana = Custodian::new("ANA", "8").with_location("OFICINA 1");
    state.custodians.push(ana.clone());
    state.active_custodian = Some(ActiveCustodian::new(ana));
    state.areas.push("7".into());
    state.area_names.insert("7".into(), "AREA 7 ADMINISTRACION".into());
    state.area_directory.insert(
        "7".into(),
        AreaDirectoryEntry {
            full_name: "AREA 7 ADMINISTRACION".into(),
            name: "LIC. PEREZ".into(),
            title: "JEFE".into(),
        },
    );
    state.notes.insert("12345".into(), "sin etiqueta".into());
    state.photos.insert("12345".into(), true);
    state.theme = "dark".into();
    state
        .layout
        .pages
        .entry("page1".into())
        .or_default()
        .insert("item-1".into(), serde_json::json!({"x": 10, "y": 20, "label": "ANA"}));

    store.log_activity("Bien ubicado", "Clave: 12345");
    store.reindex();
}

#[test]
fn saved_snapshot_loads_back_equal() {
    let dir = tempdir().unwrap();
    let mut store = StateStore::new(FileBackend::new(dir.path()));
    populated(&mut store);
    let before_save = store.state().clone();
    store.save().unwrap();
    assert!(store.state().last_autosave.is_some());

    let mut reloaded = StateStore::new(FileBackend::new(dir.path()));
    assert!(reloaded.load());
    assert_eq!(reloaded.state(), &before_save);
    assert!(reloaded.duplicates().contains("xyz"));
    assert!(!reloaded.tracker().is_dirty());
}

#[test]
fn load_then_save_leaves_snapshot_unchanged() {
    let backend = MemoryBackend::new();
    let original = serde_json::json!({
        "theme": "dark",
        "lastAutosave": "2024-01-01T00:00:00Z",
        "sessionStartTime": "2023-12-31T08:00:00Z",
        "loggedIn": true,
        "inventory": [{"CLAVE UNICA": "12345", "DESCRIPCION": "SILLA"}],
        "notes": {"12345": "sin etiqueta"}
    });
    backend.insert(SNAPSHOT_KEY, &original.to_string());

    let mut store = StateStore::new(backend.clone());
    assert!(store.load());
    let loaded: serde_json::Value = serde_json::from_str(&store.snapshot_json().unwrap()).unwrap();

    store.save().unwrap();
    let stored: serde_json::Value =
        serde_json::from_str(&backend.get(SNAPSHOT_KEY).unwrap()).unwrap();
    assert_eq!(stored, loaded);
    assert_eq!(stored["lastAutosave"], "2024-01-01T00:00:00Z");
    assert_ne!(
        store.state().last_autosave,
        Some("2024-01-01T00:00:00Z".parse().unwrap())
    );
}

#[test]
fn snapshot_text_round_trips() {
    let mut store = StateStore::new(MemoryBackend::new());
    populated(&mut store);

    let text = store.snapshot_json().unwrap();
    let parsed: SessionState = serde_json::from_str(&text).unwrap();
    assert_eq!(&parsed, store.state());
}

#[test]
fn snapshot_never_contains_derived_index() {
    let backend = MemoryBackend::new();
    let mut store = StateStore::new(backend.clone());
    populated(&mut store);
    store.save().unwrap();

    let stored: serde_json::Value =
        serde_json::from_str(&backend.get(SNAPSHOT_KEY).unwrap()).unwrap();
    let object = stored.as_object().unwrap();
    assert!(!object.contains_key("serialNumberCache"));
    assert!(!object.contains_key("duplicates"));
    assert_eq!(stored["locations"], serde_json::json!({"OFICINA": 1}));
}

#[test]
fn quota_failure_keeps_last_good_snapshot() {
    let backend = MemoryBackend::new();
    let mut store = StateStore::new(backend.clone());
    store.save().unwrap();
    let good = backend.get(SNAPSHOT_KEY).unwrap();

    let limited = backend.clone();
    limited.set_quota(Some(good.len() as u64));
    let mut store = StateStore::new(limited);
    store.load();
    populated(&mut store);

    let error = store.save().unwrap_err();
    assert!(matches!(error, PersistenceError::PersistenceFailure { .. }));
    assert!(store.is_read_only());
    assert_eq!(backend.get(SNAPSHOT_KEY).unwrap(), good);
}

#[test]
fn read_only_survives_reload_until_reset() {
    let backend = MemoryBackend::new();
    backend.insert(SNAPSHOT_KEY, r#"{"readOnlyMode":true,"inventoryFinished":true}"#);
    let mut store = StateStore::new(backend);
    store.load();

    assert!(store.is_read_only());
    assert!(matches!(store.save(), Err(PersistenceError::ReadOnly)));

    store.reset(false);
    assert!(!store.is_read_only());
    assert!(!store.state().inventory_finished);
    store.save().unwrap();
}

#[test]
fn clear_removes_stored_snapshot() {
    let backend = MemoryBackend::new();
    let mut store = StateStore::new(backend.clone());
    populated(&mut store);
    store.save().unwrap();

    store.clear().unwrap();
    assert_eq!(backend.get(SNAPSHOT_KEY), None);
    assert!(store.state().inventory.is_empty());
    assert!(!store.load());
}
