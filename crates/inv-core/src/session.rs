//! The session controller.
//!
//! [`InventorySession`] owns the state store and the blob store and is the
//! only way presentation code mutates a session. Every workflow follows the
//! same order: check preconditions, mutate, rebuild derived data when the
//! collections changed, save.
//!
//! A failed save never fails the workflow that triggered it. The session
//! latches into read-only mode, emits [`SessionEvent::ReadOnlyEntered`] once
//! and keeps the error for [`InventorySession::last_save_error`].

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Receiver;

use chrono::Utc;
use inv_archive::{ArchiveError, ExportKind, ExportedPackage, RestoreSummary};
use inv_ingest::{
    ImportProgress, ImportRequest, ImportSummary, SheetRow, ingest_rows_with_progress,
    read_sheet_rows,
};
use inv_model::{
    ActiveCustodian, AdditionalItem, AreaDirectoryEntry, AssetField, Custodian, DuplicateIndex,
    SessionState, next_location_label,
};
use inv_persistence::{
    AutoSaveConfig, AutoSaveTarget, BlobStore, FileBackend, PersistenceError, StateStore,
};

use crate::assignment::{
    AssignMode, BatchAssignment, Decision, ReassignmentProposal, apply_assignment, decide,
};
use crate::config::{AuthConfig, InventoryConfig};
use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent};
use crate::reconcile::{
    AreaTransition, DuplicatePolicy, ImportGuard, ImportStatus, check_source_file, evaluate_area,
    evaluate_inventory, merge_import,
};

/// What a single assignment changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    pub key: String,
    pub custodian: String,
    pub area: Option<AreaTransition>,
    /// This assignment located the last pending asset.
    pub inventory_completed: bool,
}

/// Result of [`InventorySession::confirm_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchConfirmation {
    pub confirmed: Vec<String>,
    /// Proposals that no longer matched the session and were left pending.
    pub stale: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalRegistration {
    pub id: String,
    /// Serial or key matches an asset already in the session.
    pub probable_duplicate: bool,
}

/// One audit session: state, blobs, configuration and subscribers.
#[derive(Debug)]
pub struct InventorySession {
    pub(crate) store: StateStore,
    pub(crate) blobs: BlobStore,
    pub(crate) auth: AuthConfig,
    pub(crate) events: EventBus,
    chunk_size: usize,
    importing: Arc<AtomicBool>,
    read_only_announced: bool,
    last_save_error: Option<PersistenceError>,
}

impl InventorySession {
    /// Wrap an already loaded store.
    pub fn new(store: StateStore, blobs: BlobStore) -> Self {
        let read_only = store.is_read_only();
        Self {
            store,
            blobs,
            auth: AuthConfig::default(),
            events: EventBus::new(),
            chunk_size: inv_ingest::DEFAULT_CHUNK_SIZE,
            importing: Arc::new(AtomicBool::new(false)),
            read_only_announced: read_only,
            last_save_error: None,
        }
    }

    /// Open the file-backed session described by `config` and load it.
    pub async fn open(config: &InventoryConfig) -> Result<Self> {
        let storage = &config.storage;
        let mut backend = FileBackend::new(storage.data_dir());
        if let Some(quota) = storage.quota_bytes {
            backend = backend.with_quota(quota);
        }

        let mut store = StateStore::new(backend)
            .with_key(storage.snapshot_key.clone())
            .with_log_capacity(storage.activity_log_capacity);
        store.load();

        let blobs = BlobStore::open(storage.blob_dir()).await?;
        Ok(Self::new(store, blobs)
            .with_auth(config.auth.clone())
            .with_chunk_size(config.import.chunk_size))
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &SessionState {
        self.store.state()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn duplicates(&self) -> &DuplicateIndex {
        self.store.duplicates()
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    pub fn is_importing(&self) -> bool {
        self.importing.load(std::sync::atomic::Ordering::Acquire)
    }

    /// A handle on the import slot that can be checked without holding the
    /// session, e.g. from outside a [`SessionHandle`] lock.
    pub fn import_status(&self) -> ImportStatus {
        ImportStatus::new(&self.importing)
    }

    pub fn last_save_error(&self) -> Option<&PersistenceError> {
        self.last_save_error.as_ref()
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether `value` matches a serial or key already in the session.
    pub fn is_probable_duplicate(&self, value: &str) -> bool {
        self.store.duplicates().contains(value)
    }

    /// Next free label for a location base, e.g. `"OFICINA 3"`.
    pub fn next_location_label(&self, base: &str) -> String {
        next_location_label(self.store.state(), base)
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.store.is_read_only() {
            return Err(SessionError::ReadOnly);
        }
        Ok(())
    }

    pub(crate) fn log(&mut self, action: &str, details: &str) {
        self.store.log_activity(action, details);
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        self.events.emit(event);
    }

    /// Save after a workflow. Returns whether the snapshot was written.
    pub(crate) fn persist(&mut self) -> bool {
        if self.store.is_read_only() {
            return false;
        }
        match self.store.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "session save failed");
                self.last_save_error = Some(e);
                self.announce_read_only();
                false
            }
        }
    }

    fn announce_read_only(&mut self) {
        if self.store.is_read_only() && !self.read_only_announced {
            self.read_only_announced = true;
            self.emit(SessionEvent::ReadOnlyEntered);
        }
    }

    /// Save now, reporting the failure to the caller.
    pub fn save(&mut self) -> Result<()> {
        let result = self.store.save();
        if let Err(e) = &result {
            tracing::error!(error = %e, "session save failed");
            self.announce_read_only();
        }
        result.map_err(SessionError::from)
    }

    /// Clear the read-only bookkeeping after the store was reset or replaced.
    pub(crate) fn sync_read_only(&mut self) {
        self.read_only_announced = self.store.is_read_only();
        if !self.read_only_announced {
            self.last_save_error = None;
        }
    }

    fn evaluate_area(&mut self, area: &str) -> Option<AreaTransition> {
        let transition = evaluate_area(self.store.state_mut(), area);
        match transition {
            Some(AreaTransition::Completed) => {
                self.log(
                    "Área completada",
                    &format!("Todos los bienes del área {area} han sido ubicados."),
                );
                self.emit(SessionEvent::AreaCompleted {
                    area: area.to_string(),
                });
            }
            Some(AreaTransition::Reopened) => {
                self.log(
                    "Área ya no completada",
                    &format!("El área {area} vuelve a tener pendientes."),
                );
                self.emit(SessionEvent::AreaReopened {
                    area: area.to_string(),
                });
            }
            None => {}
        }
        transition
    }

    fn evaluate_inventory(&mut self) -> bool {
        let completed = evaluate_inventory(self.store.state_mut());
        if completed {
            self.log("Inventario completado", "Todos los bienes han sido ubicados.");
            self.emit(SessionEvent::InventoryCompleted);
        }
        completed
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    fn active_custodian(&self) -> Result<ActiveCustodian> {
        self.store
            .state()
            .active_custodian
            .clone()
            .ok_or(SessionError::NoActiveCustodian)
    }

    /// Locate `key` under the active custodian.
    ///
    /// An asset held by someone else is not touched; the error carries a
    /// [`ReassignmentProposal`] for [`confirm_reassignment`](Self::confirm_reassignment).
    pub fn assign(&mut self, key: &str, mode: AssignMode) -> Result<AssignOutcome> {
        self.ensure_writable()?;
        let active = self.active_custodian()?;
        let asset = self
            .store
            .state()
            .asset(key)
            .ok_or_else(|| SessionError::AssetNotFound {
                key: key.to_string(),
            })?;

        let decision = decide(asset.custodian(), active.name());
        if let Decision::RequireConfirmation { holder } = decision {
            return Err(SessionError::ReassignmentConflict(
                ReassignmentProposal::new(key, holder, active.name(), mode),
            ));
        }

        let outcome = self.apply(key, &active, mode, None)?;
        self.persist();
        Ok(outcome)
    }

    /// Carry out a proposal returned by [`assign`](Self::assign).
    ///
    /// Fails with [`SessionError::StaleProposal`] when the asset changed hands
    /// or another custodian became active in the meantime.
    pub fn confirm_reassignment(
        &mut self,
        proposal: &mut ReassignmentProposal,
    ) -> Result<AssignOutcome> {
        self.ensure_writable()?;
        let active = self.validate_proposal(proposal)?;
        let outcome = self.apply(&proposal.asset_key, &active, proposal.mode, Some(&proposal.from))?;
        proposal.mark_confirmed();
        self.persist();
        Ok(outcome)
    }

    fn validate_proposal(&self, proposal: &ReassignmentProposal) -> Result<ActiveCustodian> {
        let stale = || SessionError::StaleProposal {
            key: proposal.asset_key.clone(),
        };
        if !proposal.is_pending() {
            return Err(stale());
        }

        let state = self.store.state();
        let active = state
            .active_custodian
            .as_ref()
            .filter(|active| active.name() == proposal.to)
            .ok_or_else(stale)?;
        let asset = state
            .asset(&proposal.asset_key)
            .ok_or_else(|| SessionError::AssetNotFound {
                key: proposal.asset_key.clone(),
            })?;
        if asset.custodian() != Some(proposal.from.as_str()) {
            return Err(stale());
        }
        Ok(active.clone())
    }

    fn apply(
        &mut self,
        key: &str,
        active: &ActiveCustodian,
        mode: AssignMode,
        reassigned_from: Option<&str>,
    ) -> Result<AssignOutcome> {
        let asset = self
            .store
            .state_mut()
            .asset_mut(key)
            .ok_or_else(|| SessionError::AssetNotFound {
                key: key.to_string(),
            })?;
        apply_assignment(asset, active, mode, Utc::now());
        let area = asset.origin_area.clone();

        if let Some(from) = reassigned_from {
            self.log(
                "Bien reasignado",
                &format!("Clave: {key} de {from} a {}", active.name()),
            );
        }
        self.log(
            mode.activity(),
            &format!("Clave: {key}, Usuario: {}", active.name()),
        );
        tracing::debug!(key, custodian = %active.name(), ?mode, "asset assigned");
        self.emit(SessionEvent::AssetAssigned {
            key: key.to_string(),
            custodian: active.name().to_string(),
        });

        let area = self.evaluate_area(&area);
        let inventory_completed = self.evaluate_inventory();
        Ok(AssignOutcome {
            key: key.to_string(),
            custodian: active.name().to_string(),
            area,
            inventory_completed,
        })
    }

    /// Locate every key that is free or already held by the active custodian.
    ///
    /// Keys held by others come back as proposals; nothing is done to them.
    pub fn assign_many<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        mode: AssignMode,
    ) -> Result<BatchAssignment> {
        self.ensure_writable()?;
        let active = self.active_custodian()?;
        let mut batch = BatchAssignment::default();

        for key in keys {
            let key = key.as_ref();
            let Some(asset) = self.store.state().asset(key) else {
                batch.not_found.push(key.to_string());
                continue;
            };
            let decision = decide(asset.custodian(), active.name());
            match decision {
                Decision::ApplyDirectly => {
                    self.apply(key, &active, mode, None)?;
                    batch.assigned.push(key.to_string());
                }
                Decision::RequireConfirmation { holder } => {
                    batch.proposals.push(ReassignmentProposal::new(
                        key,
                        holder,
                        active.name(),
                        mode,
                    ));
                }
            }
        }

        if !batch.assigned.is_empty() {
            self.persist();
        }
        Ok(batch)
    }

    /// Confirm every pending proposal that is still valid.
    pub fn confirm_all(
        &mut self,
        proposals: &mut [ReassignmentProposal],
    ) -> Result<BatchConfirmation> {
        self.ensure_writable()?;
        let mut result = BatchConfirmation::default();

        for proposal in proposals.iter_mut().filter(|p| p.is_pending()) {
            match self.validate_proposal(proposal) {
                Ok(active) => {
                    self.apply(&proposal.asset_key, &active, proposal.mode, Some(&proposal.from))?;
                    proposal.mark_confirmed();
                    result.confirmed.push(proposal.asset_key.clone());
                }
                Err(SessionError::StaleProposal { key } | SessionError::AssetNotFound { key }) => {
                    result.stale.push(key);
                }
                Err(e) => return Err(e),
            }
        }

        if !result.confirmed.is_empty() {
            self.persist();
        }
        Ok(result)
    }

    /// Mark `key` as not located.
    pub fn unassign(&mut self, key: &str) -> Result<()> {
        self.ensure_writable()?;
        self.clear_assignment(key)?;
        self.persist();
        Ok(())
    }

    /// Unassign every known key; returns how many were changed.
    pub fn unassign_many<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<usize> {
        self.ensure_writable()?;
        let mut changed = 0;
        for key in keys {
            match self.clear_assignment(key.as_ref()) {
                Ok(()) => changed += 1,
                Err(SessionError::AssetNotFound { key }) => {
                    tracing::debug!(key = %key, "skipping unknown asset");
                }
                Err(e) => return Err(e),
            }
        }
        if changed > 0 {
            self.persist();
        }
        Ok(changed)
    }

    fn clear_assignment(&mut self, key: &str) -> Result<()> {
        let asset = self
            .store
            .state_mut()
            .asset_mut(key)
            .ok_or_else(|| SessionError::AssetNotFound {
                key: key.to_string(),
            })?;
        asset.unlocate();
        let area = asset.origin_area.clone();

        self.log("Bien des-ubicado", &format!("Clave: {key}"));
        self.emit(SessionEvent::AssetUnassigned {
            key: key.to_string(),
        });
        self.evaluate_area(&area);
        Ok(())
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Merge one spreadsheet into the session.
    pub async fn import_spreadsheet(
        &mut self,
        request: ImportRequest,
        policy: DuplicatePolicy,
    ) -> Result<ImportSummary> {
        self.import_spreadsheet_with_progress(request, policy, |_| {})
            .await
    }

    /// Like [`import_spreadsheet`](Self::import_spreadsheet), reporting
    /// progress after every chunk.
    pub async fn import_spreadsheet_with_progress<F>(
        &mut self,
        request: ImportRequest,
        policy: DuplicatePolicy,
        on_progress: F,
    ) -> Result<ImportSummary>
    where
        F: FnMut(ImportProgress),
    {
        self.ensure_writable()?;
        // `&mut self` already serializes imports; the flag is for observers
        // holding an `ImportStatus` outside the session lock.
        let _guard = ImportGuard::acquire(&self.importing)?;
        check_source_file(self.store.state(), &request.source_file, policy)?;

        let list_id = Utc::now().timestamp_millis();
        let sheet = ingest_rows_with_progress(&request, list_id, self.chunk_size, on_progress).await;

        let summary = merge_import(self.store.state_mut(), &request, sheet, policy);
        self.store.reindex();

        let mut details = format!("Área {}: {} bienes cargados.", summary.area, summary.imported);
        if summary.skipped_rows() > 0 {
            details.push_str(&format!(" {} filas omitidas.", summary.skipped_rows()));
        }
        self.log("Carga de archivo", &details);
        self.evaluate_area(&summary.area);

        tracing::info!(
            source_file = %summary.source_file,
            area = %summary.area,
            imported = summary.imported,
            skipped = summary.skipped_rows(),
            replaced = summary.replaced,
            "imported spreadsheet"
        );
        self.emit(SessionEvent::DataImported {
            source_file: summary.source_file.clone(),
            area: summary.area.clone(),
            imported: summary.imported,
            skipped: summary.skipped_rows(),
        });
        self.persist();
        Ok(summary)
    }

    /// Import a whole sheet grid, header block included.
    pub async fn import_sheet_grid(
        &mut self,
        source_file: &str,
        grid: Vec<SheetRow>,
        policy: DuplicatePolicy,
    ) -> Result<ImportSummary> {
        let request = ImportRequest::from_sheet_grid(source_file, grid)?;
        self.import_spreadsheet(request, policy).await
    }

    /// Import a list exported as CSV.
    pub async fn import_csv_file(
        &mut self,
        path: &Path,
        policy: DuplicatePolicy,
    ) -> Result<ImportSummary> {
        let grid = read_sheet_rows(path)?;
        let source_file = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.import_sheet_grid(&source_file, grid, policy).await
    }

    // ========================================================================
    // Notes and quick edits
    // ========================================================================

    /// Attach a note to an asset; blank text removes it.
    pub fn set_note(&mut self, key: &str, text: &str) -> Result<()> {
        self.ensure_writable()?;
        if self.store.state().asset(key).is_none() {
            return Err(SessionError::AssetNotFound {
                key: key.to_string(),
            });
        }

        let text = text.trim();
        let notes = &mut self.store.state_mut().notes;
        if text.is_empty() {
            notes.remove(key);
            self.log("Nota eliminada", &format!("Clave: {key}"));
        } else {
            notes.insert(key.to_string(), text.to_string());
            self.log("Nota guardada", &format!("Clave: {key}"));
        }
        self.persist();
        Ok(())
    }

    /// Edit one field of an asset in place. Returns whether it changed.
    pub fn edit_asset_field(&mut self, key: &str, field: AssetField, value: &str) -> Result<bool> {
        self.ensure_writable()?;
        let value = value.trim();
        let asset = self
            .store
            .state_mut()
            .asset_mut(key)
            .ok_or_else(|| SessionError::AssetNotFound {
                key: key.to_string(),
            })?;
        if field.get(asset) == value {
            return Ok(false);
        }
        field.set(asset, value.to_string());

        if field == AssetField::Serial {
            self.store.reindex();
        }
        self.log("Edición rápida", &format!("Bien {key}: {field} cambiado."));
        self.persist();
        Ok(true)
    }

    // ========================================================================
    // Custodians
    // ========================================================================

    pub fn add_custodian(&mut self, custodian: Custodian) -> Result<()> {
        self.ensure_writable()?;
        let name = custodian.name.trim().to_string();
        if self.store.state().custodian(&name).is_some() {
            return Err(SessionError::CustodianExists { name });
        }

        let details = format!("{name} (Área {})", custodian.area);
        self.store.state_mut().custodians.push(Custodian {
            name,
            ..custodian
        });
        self.store.reindex();
        self.log("Usuario agregado", &details);
        self.emit(SessionEvent::CustodiansChanged);
        self.persist();
        Ok(())
    }

    /// Replace a custodian's location labels.
    pub fn update_custodian_locations(&mut self, name: &str, locations: Vec<String>) -> Result<()> {
        self.ensure_writable()?;
        let state = self.store.state_mut();
        let custodian = state
            .custodians
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| SessionError::CustodianNotFound {
                name: name.to_string(),
            })?;
        custodian.locations = locations;
        custodian.location_with_id = None;
        let updated = custodian.clone();

        if let Some(active) = state
            .active_custodian
            .as_mut()
            .filter(|active| active.name() == name)
        {
            active.custodian = updated;
        }

        self.store.reindex();
        self.log("Ubicaciones actualizadas", &format!("Usuario: {name}"));
        self.emit(SessionEvent::CustodiansChanged);
        self.persist();
        Ok(())
    }

    /// Remove a custodian that holds no located assets.
    pub fn remove_custodian(&mut self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        let state = self.store.state();
        if state.custodian(name).is_none() {
            return Err(SessionError::CustodianNotFound {
                name: name.to_string(),
            });
        }
        let assets = state
            .inventory
            .iter()
            .filter(|asset| asset.custodian() == Some(name))
            .count();
        if assets > 0 {
            return Err(SessionError::CustodianHasAssets {
                name: name.to_string(),
                assets,
            });
        }

        let state = self.store.state_mut();
        state.custodians.retain(|c| c.name != name);
        if state.active_custodian_name() == Some(name) {
            state.active_custodian = None;
        }
        self.store.reindex();
        self.log("Usuario eliminado", &format!("Usuario: {name}"));
        self.emit(SessionEvent::CustodiansChanged);
        self.persist();
        Ok(())
    }

    /// Make `name` the custodian receiving located assets.
    pub fn activate_custodian(&mut self, name: &str, precise_location: Option<String>) -> Result<()> {
        self.ensure_writable()?;
        let custodian = self
            .store
            .state()
            .custodian(name)
            .cloned()
            .ok_or_else(|| SessionError::CustodianNotFound {
                name: name.to_string(),
            })?;

        let mut active = ActiveCustodian::new(custodian);
        active.precise_location = precise_location.filter(|loc| !loc.trim().is_empty());
        self.store.state_mut().active_custodian = Some(active);
        self.log("Usuario activado", &format!("Usuario: {name}"));
        self.persist();
        Ok(())
    }

    pub fn deactivate_custodian(&mut self) -> Result<()> {
        self.ensure_writable()?;
        if self.store.state_mut().active_custodian.take().is_some() {
            self.persist();
        }
        Ok(())
    }

    // ========================================================================
    // Additional items
    // ========================================================================

    /// Register an item found on site under the active custodian.
    pub fn register_additional(&mut self, mut item: AdditionalItem) -> Result<AdditionalRegistration> {
        self.ensure_writable()?;
        let active = self.active_custodian()?;

        let duplicates = self.store.duplicates();
        let probable_duplicate = [item.serial.as_deref(), item.key.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| duplicates.contains(value));

        item.custodian = active.name().to_string();
        item.registered_at.get_or_insert_with(Utc::now);
        let id = item.id.clone();
        let details = format!("{}, Usuario: {}", item.description, active.name());

        self.store.state_mut().additional_items.push(item);
        self.store.reindex();
        self.log("Bien adicional registrado", &details);
        self.emit(SessionEvent::AdditionalItemsChanged);
        self.persist();
        Ok(AdditionalRegistration {
            id,
            probable_duplicate,
        })
    }

    fn additional_mut(&mut self, id: &str) -> Result<&mut AdditionalItem> {
        self.store
            .state_mut()
            .additional_mut(id)
            .ok_or_else(|| SessionError::AdditionalNotFound { id: id.to_string() })
    }

    /// Record whether the entry form of a personal item was received.
    pub fn mark_entry_form(&mut self, id: &str, received: bool) -> Result<()> {
        self.ensure_writable()?;
        self.additional_mut(id)?.has_entry_form = received;
        self.log(
            "Formato de entrada",
            &format!("Bien adicional {id}: {}", if received { "recibido" } else { "pendiente" }),
        );
        self.emit(SessionEvent::AdditionalItemsChanged);
        self.persist();
        Ok(())
    }

    /// Set the institutional key given during regularization; blank clears it.
    pub fn assign_label_key(&mut self, id: &str, key: &str) -> Result<()> {
        self.ensure_writable()?;
        let key = key.trim();
        self.additional_mut(id)?.assigned_key = (!key.is_empty()).then(|| key.to_string());
        self.store.reindex();
        self.log("Clave asignada", &format!("Bien adicional {id}: {key}"));
        self.emit(SessionEvent::AdditionalItemsChanged);
        self.persist();
        Ok(())
    }

    /// Delete an additional item and its photo.
    pub async fn remove_additional(&mut self, id: &str) -> Result<()> {
        self.ensure_writable()?;
        if self.store.state().additional(id).is_none() {
            return Err(SessionError::AdditionalNotFound { id: id.to_string() });
        }

        if self.store.state().additional_photos.contains_key(id) {
            let key = crate::photos::PhotoTarget::Additional(id.to_string()).blob_key();
            if let Err(e) = self.blobs.delete(inv_persistence::Collection::Photos, &key).await {
                tracing::warn!(key = %key, error = %e, "could not delete photo of removed item");
            }
        }

        let state = self.store.state_mut();
        state.additional_items.retain(|item| item.id != id);
        state.additional_photos.remove(id);
        self.store.reindex();
        self.log("Bien adicional eliminado", &format!("ID: {id}"));
        self.emit(SessionEvent::AdditionalItemsChanged);
        self.persist();
        Ok(())
    }

    // ========================================================================
    // Areas and preferences
    // ========================================================================

    fn ensure_area(&self, area: &str) -> Result<()> {
        let state = self.store.state();
        if state.areas.iter().any(|known| known == area) || state.area_assets(area).next().is_some()
        {
            Ok(())
        } else {
            Err(SessionError::AreaNotFound {
                area: area.to_string(),
            })
        }
    }

    /// Close an area administratively; it is no longer re-evaluated.
    pub fn close_area(&mut self, area: &str) -> Result<()> {
        self.ensure_writable()?;
        self.ensure_area(area)?;
        self.store
            .state_mut()
            .closed_areas
            .insert(area.to_string(), true);
        self.log("Área cerrada", &format!("Área {area}"));
        self.emit(SessionEvent::AreaClosed {
            area: area.to_string(),
        });
        self.persist();
        Ok(())
    }

    /// Reopen a closed area and re-evaluate its completion.
    pub fn reopen_area(&mut self, area: &str) -> Result<Option<AreaTransition>> {
        self.ensure_writable()?;
        self.ensure_area(area)?;
        self.store.state_mut().closed_areas.remove(area);
        self.log("Área reabierta", &format!("Área {area}"));
        let transition = self.evaluate_area(area);
        self.persist();
        Ok(transition)
    }

    pub fn set_area_directory(&mut self, area: &str, entry: AreaDirectoryEntry) -> Result<()> {
        self.ensure_writable()?;
        self.store
            .state_mut()
            .area_directory
            .insert(area.to_string(), entry);
        self.persist();
        Ok(())
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<()> {
        self.ensure_writable()?;
        self.store.state_mut().theme = theme.to_string();
        self.persist();
        Ok(())
    }

    // ========================================================================
    // Packages
    // ========================================================================

    /// Package the session and its blobs. Allowed in read-only mode.
    pub async fn export_package(&mut self, kind: ExportKind) -> Result<ExportedPackage> {
        if !self.store.is_read_only() {
            self.log("Exportación de sesión", &format!("Tipo: {kind}"));
            self.persist();
        }

        let package = inv_archive::export_package(self.store.state(), &self.blobs, kind).await?;
        self.emit(SessionEvent::PackageExported {
            kind,
            file_name: package.file_name.clone(),
        });
        Ok(package)
    }

    /// Replace the session with a package's contents.
    ///
    /// A snapshot write that fails locks the session the same way a failed
    /// save does.
    pub async fn restore_package(&mut self, bytes: &[u8]) -> Result<RestoreSummary> {
        let _guard = ImportGuard::acquire(&self.importing)?;
        let summary = match inv_archive::restore_package(&mut self.store, &self.blobs, bytes).await
        {
            Ok(summary) => summary,
            Err(ArchiveError::Persistence(e)) if self.store.is_read_only() => {
                tracing::error!(error = %e, "restore could not write the snapshot");
                self.last_save_error = Some(e);
                self.announce_read_only();
                return Err(SessionError::ReadOnly);
            }
            Err(e) => return Err(e.into()),
        };
        self.sync_read_only();
        self.emit(SessionEvent::SessionRestored {
            read_only: summary.read_only,
        });
        Ok(summary)
    }

    /// Erase the stored snapshot and every blob.
    pub async fn factory_reset(&mut self) -> Result<()> {
        self.blobs.clear_all().await?;
        self.store.clear()?;
        self.sync_read_only();
        tracing::info!("factory reset");
        self.emit(SessionEvent::SessionReset);
        Ok(())
    }
}

impl AutoSaveTarget for InventorySession {
    fn autosave_tick(&mut self, config: &AutoSaveConfig) -> Option<inv_persistence::Result<()>> {
        let result = self.store.autosave_tick(config)?;
        if let Err(e) = &result {
            tracing::error!(error = %e, "autosave failed");
            self.announce_read_only();
        }
        Some(result)
    }

    fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }
}

/// A session shared between the presentation layer and the autosave loop.
pub type SessionHandle = Arc<tokio::sync::Mutex<InventorySession>>;

impl InventorySession {
    pub fn into_handle(self) -> SessionHandle {
        Arc::new(tokio::sync::Mutex::new(self))
    }
}

/// Run the autosave safety net for `handle` on the current runtime.
pub fn spawn_autosave(handle: &SessionHandle, config: AutoSaveConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(inv_persistence::run_autosave(Arc::clone(handle), config))
}
