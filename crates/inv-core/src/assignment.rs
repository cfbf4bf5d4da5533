//! Assignment decisions and the reassignment state machine.
//!
//! Locating an asset that another custodian already holds never happens
//! silently. [`decide`] says whether confirmation is needed; when it is, the
//! session hands back a [`ReassignmentProposal`] that the caller either
//! confirms or cancels.
//!
//! ```text
//!            confirm_reassignment
//! Proposed ───────────────────────▶ Confirmed
//!     │
//!     │ cancel
//!     ▼
//! Cancelled
//! ```

use chrono::{DateTime, Utc};
use inv_model::{ActiveCustodian, Asset};

/// What a scan does to the asset besides locating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignMode {
    /// Locate; clears a pending label reprint.
    Locate,
    /// Locate and flag the label for reprinting.
    Relabel,
}

impl AssignMode {
    /// Activity log action for an assignment in this mode.
    pub const fn activity(self) -> &'static str {
        match self {
            Self::Locate => "Bien ubicado",
            Self::Relabel => "Bien marcado para re-etiquetar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    ApplyDirectly,
    /// The asset is located under `holder`, who is not the requester.
    RequireConfirmation { holder: String },
}

/// Decide how to assign an asset currently held by `current` to `requested`.
///
/// ```
/// use inv_core::assignment::{Decision, decide};
///
/// assert_eq!(decide(None, "ANA"), Decision::ApplyDirectly);
/// assert_eq!(decide(Some("ANA"), "ANA"), Decision::ApplyDirectly);
/// assert_eq!(
///     decide(Some("LUIS"), "ANA"),
///     Decision::RequireConfirmation { holder: "LUIS".into() }
/// );
/// ```
pub fn decide(current: Option<&str>, requested: &str) -> Decision {
    match current {
        Some(holder) if !holder.is_empty() && holder != requested => {
            Decision::RequireConfirmation {
                holder: holder.to_string(),
            }
        }
        _ => Decision::ApplyDirectly,
    }
}

/// Locate `asset` under the active custodian.
pub fn apply_assignment(
    asset: &mut Asset,
    active: &ActiveCustodian,
    mode: AssignMode,
    at: DateTime<Utc>,
) {
    asset.locate(
        active.name(),
        &active.custodian.area,
        active.effective_location(),
        at,
    );
    asset.reprint_label = mode == AssignMode::Relabel;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    Proposed,
    Confirmed,
    Cancelled,
}

/// A pending move of an asset from one custodian to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentProposal {
    pub asset_key: String,
    /// Custodian holding the asset when the proposal was made.
    pub from: String,
    /// Active custodian when the proposal was made.
    pub to: String,
    pub mode: AssignMode,
    state: ProposalState,
}

impl ReassignmentProposal {
    pub fn new(
        asset_key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        mode: AssignMode,
    ) -> Self {
        Self {
            asset_key: asset_key.into(),
            from: from.into(),
            to: to.into(),
            mode,
            state: ProposalState::Proposed,
        }
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ProposalState::Proposed
    }

    /// Drop the proposal. Nothing in the session changes.
    pub fn cancel(&mut self) {
        if self.is_pending() {
            self.state = ProposalState::Cancelled;
        }
    }

    pub(crate) fn mark_confirmed(&mut self) {
        self.state = ProposalState::Confirmed;
    }
}

/// Result of [`assign_many`](crate::InventorySession::assign_many).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchAssignment {
    /// Keys located directly.
    pub assigned: Vec<String>,
    /// Keys held by other custodians, awaiting confirmation.
    pub proposals: Vec<ReassignmentProposal>,
    pub not_found: Vec<String>,
}

impl BatchAssignment {
    pub fn needs_confirmation(&self) -> bool {
        !self.proposals.is_empty()
    }
}
