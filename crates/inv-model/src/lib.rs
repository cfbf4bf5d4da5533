//! Data model for field inventory sessions.
//!
//! This crate defines the records an audit session works with and the
//! single aggregate that holds them:
//!
//! - [`Asset`]: an item from an institutional inventory list
//! - [`AdditionalItem`]: an item found on site that no list contains
//! - [`Custodian`]: the person accountable for assets and locations
//! - [`SessionState`]: the persisted aggregate of one audit session
//!
//! # Derived data
//!
//! [`DuplicateIndex`] and [`location_occupancy`] are recomputed from the
//! collections in full whenever they change; see the [`index`] module.
//!
//! # Snapshot format
//!
//! `SessionState` serializes to the JSON object stored as the session
//! snapshot. Field names follow the format written by earlier releases so
//! older snapshots and session packages keep loading.

mod activity;
mod additional;
mod area;
mod asset;
mod custodian;
pub mod index;
mod layout;
mod session;
mod wire;

pub use activity::{ACTIVITY_LOG_CAPACITY, ActivityLog};
pub use additional::AdditionalItem;
pub use area::{AreaDirectoryEntry, UNKNOWN_AREA, area_id_from_label};
pub use asset::{Asset, AssetField, LocatedStatus};
pub use custodian::{ActiveCustodian, Custodian, Verifier};
pub use index::{
    DuplicateIndex, location_base_name, location_occupancy, next_location_label,
    normalize_identifier, rebuild_location_occupancy,
};
pub use layout::{ActionSelections, FIRST_PAGE, LayoutState, ReportChecks, ReportSelections};
pub use session::{DEFAULT_THEME, SessionState};
