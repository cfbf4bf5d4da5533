//! The session aggregate.
//!
//! [`SessionState`] is the single mutable record of everything an audit
//! session knows. It is serialized as one JSON object; every field has a
//! default so snapshots written before a field existed still load.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityLog;
use crate::additional::AdditionalItem;
use crate::area::AreaDirectoryEntry;
use crate::asset::Asset;
use crate::custodian::{ActiveCustodian, Custodian, Verifier};
use crate::layout::{LayoutState, ReportSelections};
use crate::wire::null_as_default;

pub const DEFAULT_THEME: &str = "light";

/// All asset, custodian and session data of one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,

    #[serde(rename = "currentUser")]
    pub current_user: Option<Verifier>,

    #[serde(deserialize_with = "null_as_default")]
    pub inventory: Vec<Asset>,

    #[serde(rename = "additionalItems", deserialize_with = "null_as_default")]
    pub additional_items: Vec<AdditionalItem>,

    #[serde(rename = "resguardantes", deserialize_with = "null_as_default")]
    pub custodians: Vec<Custodian>,

    #[serde(rename = "activeResguardante")]
    pub active_custodian: Option<ActiveCustodian>,

    /// Location base name -> number of custodians holding such a location.
    /// Always rebuilt from `custodians`.
    #[serde(deserialize_with = "null_as_default")]
    pub locations: BTreeMap<String, u32>,

    /// Known area ids, in import order.
    #[serde(deserialize_with = "null_as_default")]
    pub areas: Vec<String>,

    /// Area id -> full area label.
    #[serde(rename = "areaNames", deserialize_with = "null_as_default")]
    pub area_names: BTreeMap<String, String>,

    #[serde(rename = "areaDirectory", deserialize_with = "null_as_default")]
    pub area_directory: BTreeMap<String, AreaDirectoryEntry>,

    /// Administratively closed areas.
    #[serde(rename = "closedAreas", deserialize_with = "null_as_default")]
    pub closed_areas: BTreeMap<String, bool>,

    /// Areas detected as fully located.
    #[serde(rename = "completedAreas", deserialize_with = "null_as_default")]
    pub completed_areas: BTreeMap<String, bool>,

    #[serde(rename = "persistentAreas", deserialize_with = "null_as_default")]
    pub persistent_areas: Vec<String>,

    #[serde(rename = "lastAutosave")]
    pub last_autosave: Option<DateTime<Utc>>,

    #[serde(rename = "sessionStartTime")]
    pub session_start_time: Option<DateTime<Utc>>,

    /// Asset key -> free-text note.
    #[serde(deserialize_with = "null_as_default")]
    pub notes: BTreeMap<String, String>,

    /// Photo presence flags. Advisory: the blob store is authoritative.
    #[serde(deserialize_with = "null_as_default")]
    pub photos: BTreeMap<String, bool>,

    #[serde(rename = "additionalPhotos", deserialize_with = "null_as_default")]
    pub additional_photos: BTreeMap<String, bool>,

    #[serde(rename = "locationPhotos", deserialize_with = "null_as_default")]
    pub location_photos: BTreeMap<String, bool>,

    #[serde(deserialize_with = "null_as_default")]
    pub theme: String,

    /// One-way completion gate; only a reset clears it.
    #[serde(rename = "inventoryFinished")]
    pub inventory_finished: bool,

    /// Set once persistence fails; blocks further mutation.
    #[serde(rename = "readOnlyMode")]
    pub read_only: bool,

    #[serde(rename = "activityLog", deserialize_with = "null_as_default")]
    pub activity_log: ActivityLog,

    #[serde(flatten)]
    pub reports: ReportSelections,

    #[serde(flatten)]
    pub layout: LayoutState,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            logged_in: false,
            current_user: None,
            inventory: Vec::new(),
            additional_items: Vec::new(),
            custodians: Vec::new(),
            active_custodian: None,
            locations: BTreeMap::new(),
            areas: Vec::new(),
            area_names: BTreeMap::new(),
            area_directory: BTreeMap::new(),
            closed_areas: BTreeMap::new(),
            completed_areas: BTreeMap::new(),
            persistent_areas: Vec::new(),
            last_autosave: None,
            session_start_time: None,
            notes: BTreeMap::new(),
            photos: BTreeMap::new(),
            additional_photos: BTreeMap::new(),
            location_photos: BTreeMap::new(),
            theme: DEFAULT_THEME.to_string(),
            inventory_finished: false,
            read_only: false,
            activity_log: ActivityLog::new(),
            reports: ReportSelections::default(),
            layout: LayoutState::default(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.inventory.iter().find(|a| a.key == key)
    }

    pub fn asset_mut(&mut self, key: &str) -> Option<&mut Asset> {
        self.inventory.iter_mut().find(|a| a.key == key)
    }

    pub fn additional(&self, id: &str) -> Option<&AdditionalItem> {
        self.additional_items.iter().find(|i| i.id == id)
    }

    pub fn additional_mut(&mut self, id: &str) -> Option<&mut AdditionalItem> {
        self.additional_items.iter_mut().find(|i| i.id == id)
    }

    pub fn custodian(&self, name: &str) -> Option<&Custodian> {
        self.custodians.iter().find(|c| c.name == name)
    }

    pub fn active_custodian_name(&self) -> Option<&str> {
        self.active_custodian.as_ref().map(ActiveCustodian::name)
    }

    /// Assets that originate from `area`.
    pub fn area_assets<'a>(&'a self, area: &'a str) -> impl Iterator<Item = &'a Asset> + 'a {
        self.inventory.iter().filter(move |a| a.origin_area == area)
    }

    /// Whether any loaded asset came from `file_name`.
    pub fn has_source_file(&self, file_name: &str) -> bool {
        self.inventory.iter().any(|a| a.source_file == file_name)
    }

    /// Display name of an area, falling back to its id.
    pub fn area_display_name<'a>(&'a self, area: &'a str) -> &'a str {
        self.area_names.get(area).map_or(area, String::as_str)
    }

    // ========================================================================
    // Completion
    // ========================================================================

    /// An area is complete when it has at least one asset and all are located.
    pub fn is_area_fully_located(&self, area: &str) -> bool {
        let mut assets = self.area_assets(area).peekable();
        assets.peek().is_some() && assets.all(Asset::is_located)
    }

    pub fn is_area_closed(&self, area: &str) -> bool {
        self.closed_areas.get(area).copied().unwrap_or(false)
    }

    pub fn is_area_marked_complete(&self, area: &str) -> bool {
        self.completed_areas.get(area).copied().unwrap_or(false)
    }

    /// Every loaded asset is located (false for an empty inventory).
    pub fn all_assets_located(&self) -> bool {
        !self.inventory.is_empty() && self.inventory.iter().all(Asset::is_located)
    }

    pub fn located_count(&self) -> usize {
        self.inventory.iter().filter(|a| a.is_located()).count()
    }
}
