//! Read-only views over a session: dashboard counts, the action plan and
//! inventory search.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use inv_model::{AdditionalItem, Asset, LocatedStatus, SessionState};
use serde::Serialize;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub located: usize,
    pub pending: usize,
    /// Assets located on `today`.
    pub located_today: usize,
    /// Additional items registered on `today`.
    pub registered_today: usize,
    /// Distinct origin areas among loaded assets.
    pub working_areas: usize,
    pub additional: usize,
}

impl InventoryStats {
    /// Dates are compared in UTC.
    pub fn compute(state: &SessionState, today: NaiveDate) -> Self {
        let total = state.inventory.len();
        let located = state.located_count();
        let located_today = state
            .inventory
            .iter()
            .filter(|asset| asset.located_at.is_some_and(|at| at.date_naive() == today))
            .count();
        let registered_today = state
            .additional_items
            .iter()
            .filter(|item| item.registered_at.is_some_and(|at| at.date_naive() == today))
            .count();
        let working_areas = state
            .inventory
            .iter()
            .map(|asset| asset.origin_area.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            total,
            located,
            pending: total - located,
            located_today,
            registered_today,
            working_areas,
            additional: state.additional_items.len(),
        }
    }

    /// Items handled today across both collections.
    pub fn daily_progress(&self) -> usize {
        self.located_today + self.registered_today
    }

    /// Located share in percent, rounded down.
    pub fn percent_located(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        u8::try_from(self.located * 100 / self.total).unwrap_or(100)
    }
}

/// Follow-up work left by the audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionPlan {
    /// Ids of personal items still missing their entry form.
    pub awaiting_entry_form: Vec<String>,
    /// Keys of assets located under a custodian of another area.
    pub mismatched: Vec<String>,
    /// Keys of assets whose label must be reprinted.
    pub pending_labels: Vec<String>,
    /// Keys of assets with a note.
    pub with_notes: Vec<String>,
}

impl ActionPlan {
    pub fn compute(state: &SessionState) -> Self {
        let keys = |pred: fn(&Asset) -> bool| {
            state
                .inventory
                .iter()
                .filter(|asset| pred(asset))
                .map(|asset| asset.key.clone())
                .collect::<Vec<_>>()
        };

        Self {
            awaiting_entry_form: state
                .additional_items
                .iter()
                .filter(|item| item.needs_regularization())
                .map(|item| item.id.clone())
                .collect(),
            mismatched: keys(|asset| asset.is_located() && asset.area_mismatch),
            pending_labels: keys(|asset| asset.reprint_label),
            with_notes: state.notes.keys().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.awaiting_entry_form.is_empty()
            && self.mismatched.is_empty()
            && self.pending_labels.is_empty()
            && self.with_notes.is_empty()
    }
}

/// Inventory search criteria. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    /// Matched against key, description, brand, model and serial.
    pub term: String,
    pub status: Option<LocatedStatus>,
    pub area: Option<String>,
    pub list_type: Option<String>,
}

impl AssetFilter {
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        asset.matches(&self.term)
            && self.status.is_none_or(|status| asset.status == status)
            && self.area.as_ref().is_none_or(|area| &asset.origin_area == area)
            && self
                .list_type
                .as_ref()
                .is_none_or(|list_type| &asset.list_type == list_type)
    }

    pub fn apply<'a>(&self, state: &'a SessionState) -> Vec<&'a Asset> {
        state.inventory.iter().filter(|a| self.matches(a)).collect()
    }

    /// The single asset whose key equals the search term, if that is the
    /// only match.
    pub fn exact_match<'a>(&self, state: &'a SessionState) -> Option<&'a Asset> {
        let term = self.term.trim();
        match self.apply(state).as_slice() {
            [only] if !term.is_empty() && only.key.eq_ignore_ascii_case(term) => Some(*only),
            _ => None,
        }
    }
}

/// Additional items matching `term` in any identifying field.
pub fn search_additional<'a>(state: &'a SessionState, term: &str) -> Vec<&'a AdditionalItem> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    state
        .additional_items
        .iter()
        .filter(|item| {
            [
                Some(item.description.as_str()),
                Some(item.brand.as_str()),
                Some(item.model.as_str()),
                item.key.as_deref(),
                item.serial.as_deref(),
                item.assigned_key.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> SessionState {
        let mut state = SessionState::new();
        for (key, area) in [("10001", "1"), ("10002", "1"), ("20001", "2")] {
            let mut asset = Asset::new(key);
            asset.origin_area = area.into();
            asset.list_type = "LIBRO A".into();
            state.inventory.push(asset);
        }
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        state.inventory[0].locate("ANA", "2", None, at);
        state.inventory[0].reprint_label = true;

        let mut item = AdditionalItem::new("MONITOR", "ANA");
        item.personal = true;
        item.serial = Some("SN-77".into());
        item.registered_at = Some(at);
        state.additional_items.push(item);
        state.notes.insert("20001".into(), "rayado".into());
        state
    }

    #[test]
    fn test_stats() {
        let state = sample();
        let stats = InventoryStats::compute(&state, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.located, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.daily_progress(), 2);
        assert_eq!(stats.working_areas, 2);
        assert_eq!(stats.percent_located(), 33);

        let later = InventoryStats::compute(&state, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(later.daily_progress(), 0);
    }

    #[test]
    fn test_action_plan() {
        let plan = ActionPlan::compute(&sample());
        assert_eq!(plan.mismatched, vec!["10001"]);
        assert_eq!(plan.pending_labels, vec!["10001"]);
        assert_eq!(plan.with_notes, vec!["20001"]);
        assert_eq!(plan.awaiting_entry_form.len(), 1);
        assert!(ActionPlan::compute(&SessionState::new()).is_empty());
    }

    #[test]
    fn test_filter_and_exact_match() {
        let state = sample();
        let located = AssetFilter {
            status: Some(LocatedStatus::Located),
            ..AssetFilter::default()
        };
        assert_eq!(located.apply(&state).len(), 1);

        let area = AssetFilter {
            area: Some("1".into()),
            ..AssetFilter::default()
        };
        assert_eq!(area.apply(&state).len(), 2);

        assert_eq!(
            AssetFilter::term("20001").exact_match(&state).map(|a| a.key.as_str()),
            Some("20001")
        );
        assert!(AssetFilter::term("1000").exact_match(&state).is_none());
    }

    #[test]
    fn test_search_additional() {
        let state = sample();
        assert_eq!(search_additional(&state, "sn-77").len(), 1);
        assert!(search_additional(&state, "").is_empty());
        assert!(search_additional(&state, "teclado").is_empty());
    }
}
