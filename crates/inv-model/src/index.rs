//! Derived lookup structures.
//!
//! Both structures are pure functions of the session's collections and are
//! always recomputed in full; there is no incremental update path.
//!
//! - [`DuplicateIndex`]: normalized serials and keys of every asset, used to
//!   flag probable duplicates before inserting additional items.
//! - [`location_occupancy`]: custodian count per location base name.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::additional::AdditionalItem;
use crate::session::SessionState;

/// Location label split into base name and trailing numeric suffix.
static LOCATION_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*(\d+)$").expect("Invalid location suffix regex"));

/// Normalize a serial or key for duplicate detection.
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Set of normalized serials and keys across both asset collections.
///
/// Never persisted and never a source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    values: HashSet<String>,
}

impl DuplicateIndex {
    /// Build the index from scratch.
    pub fn build(state: &SessionState) -> Self {
        let mut index = Self::default();
        index.rebuild(state);
        index
    }

    /// Clear and repopulate from the current collections.
    pub fn rebuild(&mut self, state: &SessionState) {
        self.values.clear();

        let inventory = state
            .inventory
            .iter()
            .flat_map(|asset| [asset.serial.as_str(), asset.key.as_str()]);
        let additional = state
            .additional_items
            .iter()
            .flat_map(AdditionalItem::identifiers);

        for value in inventory.chain(additional) {
            let normalized = normalize_identifier(value);
            if !normalized.is_empty() {
                self.values.insert(normalized);
            }
        }

        tracing::debug!(entries = self.values.len(), "rebuilt duplicate index");
    }

    /// Whether `value` matches a known serial or key (advisory only).
    pub fn contains(&self, value: &str) -> bool {
        let normalized = normalize_identifier(value);
        !normalized.is_empty() && self.values.contains(&normalized)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// Base name of a location label: trailing number stripped, uppercased.
///
/// ```
/// use inv_model::location_base_name;
///
/// assert_eq!(location_base_name("Oficina 3"), "OFICINA");
/// assert_eq!(location_base_name("BODEGA"), "BODEGA");
/// ```
pub fn location_base_name(label: &str) -> String {
    let trimmed = label.trim();
    LOCATION_SUFFIX_REGEX
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str())
        .trim()
        .to_uppercase()
}

/// Count custodians per location base name.
pub fn location_occupancy(state: &SessionState) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for custodian in &state.custodians {
        for label in custodian.location_labels() {
            if label.trim().is_empty() {
                continue;
            }
            *counts.entry(location_base_name(label)).or_insert(0) += 1;
        }
    }
    counts
}

/// Recompute `state.locations` from the custodian list.
pub fn rebuild_location_occupancy(state: &mut SessionState) {
    state.locations = location_occupancy(state);
}

/// Next free label for a location base, e.g. `"OFICINA 3"` when two exist.
pub fn next_location_label(state: &SessionState, base: &str) -> String {
    let base = location_base_name(base);
    let taken = state.locations.get(&base).copied().unwrap_or(0);
    format!("{base} {}", taken + 1)
}
