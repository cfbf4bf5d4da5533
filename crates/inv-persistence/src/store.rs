//! The state store: one in-memory session plus its durable snapshot.

use chrono::Utc;
use inv_model::index::rebuild_location_occupancy;
use inv_model::{ACTIVITY_LOG_CAPACITY, DuplicateIndex, SessionState};

use crate::autosave::{AutoSaveConfig, AutoSaveTarget, DirtyTracker};
use crate::backend::SnapshotBackend;
use crate::error::{PersistenceError, Result};

/// Key the session snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "inventarioProState";

/// Owns the session state, its derived indexes and the snapshot backend.
///
/// The duplicate index is kept here rather than in [`SessionState`] so it
/// can never be serialized.
#[derive(Debug)]
pub struct StateStore {
    backend: Box<dyn SnapshotBackend>,
    key: String,
    state: SessionState,
    duplicates: DuplicateIndex,
    tracker: DirtyTracker,
    log_capacity: usize,
}

impl StateStore {
    /// Create a store with default state. Call [`load`](Self::load) to read
    /// an existing snapshot.
    pub fn new(backend: impl SnapshotBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            key: SNAPSHOT_KEY.to_string(),
            state: SessionState::default(),
            duplicates: DuplicateIndex::default(),
            tracker: DirtyTracker::new(),
            log_capacity: ACTIVITY_LOG_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access; marks the store dirty.
    pub fn state_mut(&mut self) -> &mut SessionState {
        self.tracker.mark_dirty();
        &mut self.state
    }

    pub fn duplicates(&self) -> &DuplicateIndex {
        &self.duplicates
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.state.read_only
    }

    pub fn mark_dirty(&mut self) {
        self.tracker.mark_dirty();
    }

    // ========================================================================
    // Load / save
    // ========================================================================

    /// Load the stored snapshot over the default state.
    ///
    /// Returns whether a snapshot was found. A snapshot that fails to parse
    /// is removed and the defaults are kept.
    pub fn load(&mut self) -> bool {
        let loaded = match self.backend.read(&self.key) {
            Ok(Some(text)) => match serde_json::from_str::<SessionState>(&text) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "discarding corrupt snapshot");
                    if let Err(e) = self.backend.remove(&self.key) {
                        tracing::warn!(error = %e, "could not remove corrupt snapshot");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "could not read snapshot");
                None
            }
        };

        let found = loaded.is_some();
        self.state = loaded.unwrap_or_default();
        self.state.layout.repair();
        self.reindex();
        self.tracker = DirtyTracker::new();

        tracing::info!(
            key = %self.key,
            found,
            assets = self.state.inventory.len(),
            read_only = self.state.read_only,
            "loaded session"
        );
        found
    }

    /// Serialize the state and write it to the backend.
    ///
    /// Any failure puts the store into read-only mode for the rest of the
    /// session; there is no retry. `last_autosave` is stamped in memory once
    /// the write lands, so the stored snapshot carries the previous stamp.
    pub fn save(&mut self) -> Result<()> {
        if self.state.read_only {
            return Err(PersistenceError::ReadOnly);
        }

        let text = serde_json::to_string(&self.state)
            .map_err(|source| self.fail_save(PersistenceError::Serialization { source }))?;

        self.tracker.start_save();
        match self.backend.write(&self.key, &text) {
            Ok(()) => {
                self.tracker.save_complete();
                self.state.last_autosave = Some(Utc::now());
                tracing::debug!(key = %self.key, bytes = text.len(), "saved session");
                Ok(())
            }
            Err(e) => {
                let key = self.key.clone();
                Err(self.fail_save(PersistenceError::PersistenceFailure {
                    key,
                    source: Box::new(e),
                }))
            }
        }
    }

    /// Latch read-only after a failed save and hand the error back.
    fn fail_save(&mut self, error: PersistenceError) -> PersistenceError {
        self.tracker.save_failed();
        self.state.read_only = true;
        tracing::error!(key = %self.key, error = %error, "save failed, entering read-only mode");
        error
    }

    /// The snapshot text `save` would write, without writing it.
    pub fn snapshot_json(&self) -> Result<String> {
        serde_json::to_string(&self.state)
            .map_err(|source| PersistenceError::Serialization { source })
    }

    /// Write `text` as the stored snapshot and load it.
    ///
    /// The text is parsed first; unparseable text is rejected without
    /// touching the stored snapshot.
    pub fn replace_snapshot(&mut self, text: &str) -> Result<()> {
        serde_json::from_str::<SessionState>(text)
            .map_err(|source| PersistenceError::Serialization { source })?;

        if let Err(e) = self.backend.write(&self.key, text) {
            let key = self.key.clone();
            return Err(self.fail_save(PersistenceError::PersistenceFailure {
                key,
                source: Box::new(e),
            }));
        }

        self.load();
        Ok(())
    }

    /// Replace the state with defaults.
    ///
    /// The theme always survives. With `keep_current_user` the verifier
    /// stays logged in and a new session starts.
    pub fn reset(&mut self, keep_current_user: bool) {
        let theme = std::mem::take(&mut self.state.theme);
        let user = self.state.current_user.take();

        self.state = SessionState {
            theme,
            ..SessionState::default()
        };
        if keep_current_user && user.is_some() {
            self.state.current_user = user;
            self.state.logged_in = true;
            self.state.session_start_time = Some(Utc::now());
        }

        self.reindex();
        self.tracker.mark_dirty();
        tracing::info!(keep_current_user, "session reset");
    }

    /// Remove the stored snapshot and return to defaults.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove(&self.key)?;
        self.state = SessionState::default();
        self.reindex();
        self.tracker = DirtyTracker::new();
        tracing::info!(key = %self.key, "cleared stored session");
        Ok(())
    }

    // ========================================================================
    // Derived data
    // ========================================================================

    /// Rebuild the duplicate index and location occupancy from scratch.
    pub fn reindex(&mut self) {
        self.duplicates.rebuild(&self.state);
        rebuild_location_occupancy(&mut self.state);
    }

    /// Append to the bounded activity log.
    pub fn log_activity(&mut self, action: &str, details: &str) {
        self.state
            .activity_log
            .record(action, details, self.log_capacity);
        self.tracker.mark_dirty();
    }
}

impl AutoSaveTarget for StateStore {
    fn autosave_tick(&mut self, config: &AutoSaveConfig) -> Option<Result<()>> {
        if self.state.read_only || !self.tracker.should_auto_save(config) {
            return None;
        }
        tracing::debug!(pending = self.tracker.pending_changes(), "autosave due");
        Some(self.save())
    }

    fn is_read_only(&self) -> bool {
        self.state.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use inv_model::{Asset, Custodian, Verifier};

    #[test]
    fn test_load_without_snapshot() {
        let mut store = StateStore::new(MemoryBackend::new());
        assert!(!store.load());
        assert_eq!(store.state().theme, "light");
    }

    #[test]
    fn test_corrupt_snapshot_is_removed() {
        let backend = MemoryBackend::new();
        backend.insert(SNAPSHOT_KEY, "{not json");
        let mut store = StateStore::new(backend.clone());

        assert!(!store.load());
        assert_eq!(backend.get(SNAPSHOT_KEY), None);
    }

    #[test]
    fn test_load_rebuilds_indexes() {
        let backend = MemoryBackend::new();
        let mut writer = StateStore::new(backend.clone());
        writer.state_mut().inventory.push(Asset::new("12345"));
        writer
            .state_mut()
            .custodians
            .push(Custodian::new("ANA", "1").with_location("OFICINA 1"));
        writer.state_mut().locations.insert("STALE".into(), 9);
        writer.save().unwrap();

        let mut reader = StateStore::new(backend);
        assert!(reader.load());
        assert!(reader.duplicates().contains("12345"));
        assert_eq!(reader.state().locations.get("OFICINA"), Some(&1));
        assert!(!reader.state().locations.contains_key("STALE"));
    }

    #[test]
    fn test_save_failure_enters_read_only() {
        let mut store = StateStore::new(MemoryBackend::new().with_quota(10));
        store.state_mut().inventory.push(Asset::new("12345"));

        let result = store.save();
        assert!(matches!(
            result,
            Err(PersistenceError::PersistenceFailure { .. })
        ));
        assert!(store.is_read_only());
        assert!(store.state().last_autosave.is_none());
        assert!(matches!(store.save(), Err(PersistenceError::ReadOnly)));
    }

    #[test]
    fn test_save_keeps_loaded_stamp_in_snapshot() {
        let backend = MemoryBackend::new();
        backend.insert(SNAPSHOT_KEY, r#"{"lastAutosave":"2024-01-01T00:00:00Z"}"#);
        let mut store = StateStore::new(backend.clone());
        store.load();
        let loaded = store.state().last_autosave;

        store.save().unwrap();
        let stored: SessionState =
            serde_json::from_str(&backend.get(SNAPSHOT_KEY).unwrap()).unwrap();
        assert_eq!(stored.last_autosave, loaded);
        assert!(store.state().last_autosave > loaded);
    }

    #[test]
    fn test_unserializable_state_latches_read_only() {
        let mut store = StateStore::new(MemoryBackend::new());
        store.mark_dirty();
        let source = serde_json::from_str::<u8>("not a number").unwrap_err();

        let error = store.fail_save(PersistenceError::Serialization { source });
        assert!(matches!(error, PersistenceError::Serialization { .. }));
        assert!(store.is_read_only());
        assert!(store.tracker().is_dirty());
        assert!(matches!(store.save(), Err(PersistenceError::ReadOnly)));
    }

    #[test]
    fn test_reset_keeps_theme_and_user() {
        let mut store = StateStore::new(MemoryBackend::new());
        store.state_mut().theme = "dark".into();
        store.state_mut().current_user = Some(Verifier::new("41290", "AUDITOR"));
        store.state_mut().inventory.push(Asset::new("12345"));
        store.state_mut().read_only = true;
        store.reindex();

        store.reset(true);
        assert_eq!(store.state().theme, "dark");
        assert!(store.state().logged_in);
        assert!(store.state().current_user.is_some());
        assert!(store.state().session_start_time.is_some());
        assert!(store.state().inventory.is_empty());
        assert!(!store.is_read_only());
        assert!(store.duplicates().is_empty());

        store.reset(false);
        assert!(store.state().current_user.is_none());
        assert!(!store.state().logged_in);
    }

    #[test]
    fn test_replace_snapshot_rejects_garbage() {
        let backend = MemoryBackend::new();
        backend.insert(SNAPSHOT_KEY, r#"{"theme":"dark"}"#);
        let mut store = StateStore::new(backend.clone());
        store.load();

        assert!(matches!(
            store.replace_snapshot("{oops"),
            Err(PersistenceError::Serialization { .. })
        ));
        assert_eq!(backend.get(SNAPSHOT_KEY).as_deref(), Some(r#"{"theme":"dark"}"#));

        store
            .replace_snapshot(r#"{"theme":"blue","inventory":[{"CLAVE UNICA":"54321"}]}"#)
            .unwrap();
        assert_eq!(store.state().theme, "blue");
        assert!(store.duplicates().contains("54321"));
    }

    #[test]
    fn test_activity_log_is_bounded() {
        let mut store = StateStore::new(MemoryBackend::new()).with_log_capacity(3);
        for i in 0..5 {
            store.log_activity("Evento", &i.to_string());
        }
        assert_eq!(store.state().activity_log.len(), 3);
        assert!(store.state().activity_log.last().unwrap().ends_with("Evento: 4"));
        assert!(store.tracker().is_dirty());
    }
}
