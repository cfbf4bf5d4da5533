//! Merging imported lists into the session and completion tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use inv_ingest::{ImportRequest, ImportSummary, IngestedSheet};
use inv_model::{AreaDirectoryEntry, SessionState};

use crate::error::{Result, SessionError};

/// What to do when a file with the same name was already imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Refuse with [`SessionError::DuplicateSourceFile`] so the caller can ask.
    #[default]
    Ask,
    /// Drop the assets of the earlier import first.
    Replace,
    /// Keep both imports.
    Append,
}

/// Read-only view of a session's import slot.
///
/// A clone stays usable while the session itself is locked, so a caller
/// can turn away a second import instead of queueing it on the lock.
#[derive(Debug, Clone)]
pub struct ImportStatus {
    flag: Arc<AtomicBool>,
}

impl ImportStatus {
    pub fn new(flag: &Arc<AtomicBool>) -> Self {
        Self {
            flag: Arc::clone(flag),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Held for the duration of one import; a second acquire fails.
#[derive(Debug)]
pub struct ImportGuard {
    flag: Arc<AtomicBool>,
}

impl ImportGuard {
    pub fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::ImportInProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for ImportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Check the duplicate-file policy before any work is done.
pub fn check_source_file(
    state: &SessionState,
    source_file: &str,
    policy: DuplicatePolicy,
) -> Result<()> {
    if policy == DuplicatePolicy::Ask && state.has_source_file(source_file) {
        return Err(SessionError::DuplicateSourceFile {
            file_name: source_file.to_string(),
        });
    }
    Ok(())
}

/// Merge converted assets into `state`.
///
/// Located assets of other files are never touched. Returns the summary
/// with `replaced` filled in.
pub fn merge_import(
    state: &mut SessionState,
    request: &ImportRequest,
    sheet: IngestedSheet,
    policy: DuplicatePolicy,
) -> ImportSummary {
    let IngestedSheet {
        assets,
        mut summary,
    } = sheet;

    if policy == DuplicatePolicy::Replace {
        let before = state.inventory.len();
        state
            .inventory
            .retain(|asset| asset.source_file != request.source_file);
        summary.replaced = before - state.inventory.len();
    }

    state.inventory.extend(assets);
    record_area(state, request, &summary.area);
    summary
}

/// Register the area's label and responsible person if not yet known.
fn record_area(state: &mut SessionState, request: &ImportRequest, area: &str) {
    if !state.areas.iter().any(|known| known == area) {
        state.areas.push(area.to_string());
    }
    state
        .area_names
        .entry(area.to_string())
        .or_insert_with(|| request.area_label.clone());

    if let Some(responsible) = &request.responsible {
        state
            .area_directory
            .entry(area.to_string())
            .or_insert_with(|| AreaDirectoryEntry {
                full_name: request.area_label.clone(),
                name: responsible.name.clone(),
                title: responsible.title.clone(),
            });
    }
}

/// Change in an area's completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaTransition {
    Completed,
    Reopened,
}

/// Recompute the completion flag of `area`.
///
/// Closed areas are left alone.
pub fn evaluate_area(state: &mut SessionState, area: &str) -> Option<AreaTransition> {
    if area.is_empty() || state.is_area_closed(area) {
        return None;
    }

    let complete = state.is_area_fully_located(area);
    let was_complete = state.is_area_marked_complete(area);
    match (complete, was_complete) {
        (true, false) => {
            state.completed_areas.insert(area.to_string(), true);
            Some(AreaTransition::Completed)
        }
        (false, true) => {
            state.completed_areas.remove(area);
            Some(AreaTransition::Reopened)
        }
        _ => None,
    }
}

/// Latch the inventory-finished gate. Returns true the first time only.
pub fn evaluate_inventory(state: &mut SessionState) -> bool {
    if state.inventory_finished || !state.all_assets_located() {
        return false;
    }
    state.inventory_finished = true;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inv_model::Asset;

    fn asset(key: &str, area: &str, file: &str) -> Asset {
        let mut asset = Asset::new(key);
        asset.origin_area = area.into();
        asset.source_file = file.into();
        asset
    }

    #[test]
    fn test_guard_rejects_second_import() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = ImportGuard::acquire(&flag).unwrap();
        assert!(matches!(
            ImportGuard::acquire(&flag),
            Err(SessionError::ImportInProgress)
        ));

        drop(guard);
        assert!(ImportGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_status_follows_guard() {
        let flag = Arc::new(AtomicBool::new(false));
        let status = ImportStatus::new(&flag);
        assert!(!status.is_active());

        let guard = ImportGuard::acquire(&flag).unwrap();
        assert!(status.clone().is_active());
        drop(guard);
        assert!(!status.is_active());
    }

    #[test]
    fn test_ask_policy_refuses_known_file() {
        let mut state = SessionState::new();
        state.inventory.push(asset("12345", "7", "a.xlsx"));

        assert!(check_source_file(&state, "a.xlsx", DuplicatePolicy::Ask).is_err());
        assert!(check_source_file(&state, "a.xlsx", DuplicatePolicy::Append).is_ok());
        assert!(check_source_file(&state, "b.xlsx", DuplicatePolicy::Ask).is_ok());
    }

    #[test]
    fn test_area_completion_flips_both_ways() {
        let mut state = SessionState::new();
        state.inventory.push(asset("12345", "7", "a.xlsx"));
        assert_eq!(evaluate_area(&mut state, "7"), None);

        state.inventory[0].locate("ANA", "7", None, Utc::now());
        assert_eq!(evaluate_area(&mut state, "7"), Some(AreaTransition::Completed));
        assert_eq!(evaluate_area(&mut state, "7"), None);

        state.inventory[0].unlocate();
        assert_eq!(evaluate_area(&mut state, "7"), Some(AreaTransition::Reopened));
        assert!(!state.is_area_marked_complete("7"));
    }

    #[test]
    fn test_closed_area_is_not_evaluated() {
        let mut state = SessionState::new();
        state.inventory.push(asset("12345", "7", "a.xlsx"));
        state.inventory[0].locate("ANA", "7", None, Utc::now());
        state.closed_areas.insert("7".into(), true);

        assert_eq!(evaluate_area(&mut state, "7"), None);
        assert!(!state.is_area_marked_complete("7"));
    }

    #[test]
    fn test_inventory_gate_latches_once() {
        let mut state = SessionState::new();
        assert!(!evaluate_inventory(&mut state));

        state.inventory.push(asset("12345", "7", "a.xlsx"));
        state.inventory[0].locate("ANA", "7", None, Utc::now());
        assert!(evaluate_inventory(&mut state));
        assert!(!evaluate_inventory(&mut state));

        state.inventory[0].unlocate();
        assert!(!evaluate_inventory(&mut state));
        assert!(state.inventory_finished);
    }
}
