//! Session controller for field inventory audits.
//!
//! [`InventorySession`] is the entry point a presentation layer embeds. It
//! owns the persisted session and the photo store and implements every
//! workflow of an audit:
//!
//! - **Assignment**: locating assets under the active custodian, with an
//!   explicit confirmation step when an asset changes hands
//!   ([`assignment`])
//! - **Reconciliation**: merging spreadsheet imports, area and inventory
//!   completion tracking ([`reconcile`])
//! - **Evidence**: photos, notes, additional items and custodians
//! - **Packages**: backup and final zip export, restore
//! - **Reports**: inventory and pending-label listings as CSV ([`reports`])
//! - **Auth**: verifier login against a configured allow-list
//!
//! State changes are announced as [`SessionEvent`]s to every receiver
//! returned by [`InventorySession::subscribe`].
//!
//! # Example
//!
//! ```no_run
//! use inv_core::{AssignMode, InventoryConfig, InventorySession};
//!
//! # async fn run() -> inv_core::Result<()> {
//! let config = InventoryConfig::load();
//! inv_core::init_logging(&config.logging).ok();
//! let mut session = InventorySession::open(&config).await?;
//! session.login("41290")?;
//! session.activate_custodian("ANA", None)?;
//! session.assign("12345", AssignMode::Locate)?;
//! # Ok(())
//! # }
//! ```

pub mod assignment;
mod auth;
pub mod config;
mod error;
pub mod events;
pub mod logging;
mod photos;
pub mod queries;
pub mod reconcile;
pub mod reports;
mod session;

pub use assignment::{
    AssignMode, BatchAssignment, Decision, ProposalState, ReassignmentProposal, decide,
};
pub use auth::LoginOutcome;
pub use config::{AuthConfig, ImportConfig, InventoryConfig, StorageConfig};
pub use error::{ConfigError, Result, SessionError};
pub use events::{EventBus, SessionEvent};
pub use logging::{LogConfig, LogFormat, LogLevel, init_logging};
pub use photos::{MAX_PHOTO_BYTES, PhotoTarget};
pub use queries::{ActionPlan, AssetFilter, InventoryStats, search_additional};
pub use reconcile::{AreaTransition, DuplicatePolicy, ImportStatus};
pub use reports::{InventoryReport, LabelReport};
pub use session::{
    AdditionalRegistration, AssignOutcome, BatchConfirmation, InventorySession, SessionHandle,
    spawn_autosave,
};

pub use inv_archive::{ExportKind, ExportedPackage, RestoreSummary};
pub use inv_ingest::{ImportRequest, ImportSummary, SheetRow};
