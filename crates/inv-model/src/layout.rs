//! Sketch-editor layout data and per-report UI selections.
//!
//! Both are owned by presentation collaborators; the engine only persists
//! them. Item payloads are kept as opaque JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::wire::null_as_default;

pub const FIRST_PAGE: &str = "page1";

/// Multi-page spatial layout of the audited site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutState {
    /// Page id -> item id -> item payload.
    #[serde(rename = "mapLayout", deserialize_with = "null_as_default")]
    pub pages: BTreeMap<String, BTreeMap<String, serde_json::Value>>,

    #[serde(rename = "currentLayoutPage", deserialize_with = "null_as_default")]
    pub current_page: String,

    #[serde(rename = "layoutPageNames", deserialize_with = "null_as_default")]
    pub page_names: BTreeMap<String, String>,

    /// Image id -> metadata; image bytes live in the blob store.
    #[serde(rename = "layoutImages", deserialize_with = "null_as_default")]
    pub images: BTreeMap<String, serde_json::Value>,

    #[serde(rename = "layoutPageColors", deserialize_with = "null_as_default")]
    pub page_colors: BTreeMap<String, String>,

    #[serde(rename = "layoutItemColors", deserialize_with = "null_as_default")]
    pub item_colors: BTreeMap<String, String>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            pages: BTreeMap::from([(FIRST_PAGE.to_string(), BTreeMap::new())]),
            current_page: FIRST_PAGE.to_string(),
            page_names: BTreeMap::from([(FIRST_PAGE.to_string(), "Página 1".to_string())]),
            images: BTreeMap::new(),
            page_colors: BTreeMap::from([(FIRST_PAGE.to_string(), "#ffffff".to_string())]),
            item_colors: BTreeMap::new(),
        }
    }
}

impl LayoutState {
    /// Restore the default page set when a snapshot stored empty values.
    pub fn repair(&mut self) {
        let defaults = Self::default();
        if self.pages.is_empty() {
            self.pages = defaults.pages;
        }
        if self.current_page.is_empty() {
            self.current_page = defaults.current_page;
        }
        if self.page_names.is_empty() {
            self.page_names = defaults.page_names;
        }
    }
}

/// Checkbox selections of the action-plan reports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSelections {
    pub labels: BTreeMap<String, bool>,
    pub notes: BTreeMap<String, bool>,
    pub additional: BTreeMap<String, bool>,
    pub mismatched: BTreeMap<String, bool>,
    pub personal: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportChecks {
    pub notes: BTreeMap<String, bool>,
    pub mismatched: BTreeMap<String, bool>,
}

/// Per-report UI checkbox selections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSelections {
    #[serde(rename = "institutionalReportCheckboxes", deserialize_with = "null_as_default")]
    pub institutional: BTreeMap<String, serde_json::Value>,

    #[serde(rename = "actionCheckboxes", deserialize_with = "null_as_default")]
    pub actions: ActionSelections,

    #[serde(rename = "reportCheckboxes", deserialize_with = "null_as_default")]
    pub reports: ReportChecks,
}
