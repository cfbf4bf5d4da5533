//! The autosave loop against a shared store.

use std::sync::Arc;
use std::time::Duration;

use inv_model::Asset;
use inv_persistence::{AutoSaveConfig, AutoSaveTarget, MemoryBackend, SNAPSHOT_KEY, StateStore};
use tokio::sync::Mutex;

fn fast_config() -> AutoSaveConfig {
    AutoSaveConfig {
        enabled: true,
        interval_ms: 5,
        debounce_ms: 0,
        max_delay_ms: 0,
    }
}

#[test]
fn tick_saves_only_dirty_state() {
    let backend = MemoryBackend::new();
    let mut store = StateStore::new(backend.clone());
    assert!(store.autosave_tick(&fast_config()).is_none());

    store.state_mut().inventory.push(Asset::new("12345"));
    assert!(matches!(store.autosave_tick(&fast_config()), Some(Ok(()))));
    assert!(backend.get(SNAPSHOT_KEY).unwrap().contains("12345"));
    assert!(store.autosave_tick(&fast_config()).is_none());
}

#[tokio::test]
async fn loop_exits_when_disabled() {
    let store = Arc::new(Mutex::new(StateStore::new(MemoryBackend::new())));
    tokio::time::timeout(
        Duration::from_secs(1),
        inv_persistence::run_autosave(store, AutoSaveConfig::disabled()),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn loop_stops_after_failed_save() {
    let mut store = StateStore::new(MemoryBackend::new().with_quota(1));
    store.mark_dirty();
    let store = Arc::new(Mutex::new(store));

    let handle = tokio::spawn(inv_persistence::run_autosave(
        Arc::clone(&store),
        fast_config(),
    ));
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    assert!(store.lock().await.is_read_only());
}
