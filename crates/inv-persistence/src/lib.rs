//! Durable storage for inventory sessions.
//!
//! This crate keeps an audit session alive across restarts of the host
//! application.
//!
//! # Features
//!
//! - **State store** owning the session and its derived indexes
//! - **Atomic writes** (temp file + rename) for file-backed snapshots
//! - **Read-only latch** after the first failed save
//! - **Auto-save** safety net with debounce
//! - **Blob store** for photos and layout images
//!
//! # Snapshot Format
//!
//! The session is stored as one JSON document under the key
//! [`SNAPSHOT_KEY`]. Unknown fields are ignored and missing fields fall back
//! to their defaults, so snapshots from older releases load unchanged.
//!
//! # Example
//!
//! ```no_run
//! use inv_persistence::{FileBackend, StateStore};
//!
//! let mut store = StateStore::new(FileBackend::new("/var/lib/inventario"));
//! if !store.load() {
//!     store.log_activity("Sesión iniciada", "nueva");
//! }
//! store.save()?;
//! # Ok::<(), inv_persistence::PersistenceError>(())
//! ```

mod autosave;
mod backend;
pub mod blob;
mod error;
mod store;

pub use autosave::{AutoSaveConfig, AutoSaveTarget, DirtyTracker, run_autosave};
pub use backend::{FileBackend, MemoryBackend, SnapshotBackend};
pub use blob::{BLOB_SCHEMA_VERSION, BlobStore, Collection};
pub use error::{BlobError, BlobResult, PersistenceError, Result};
pub use store::{SNAPSHOT_KEY, StateStore};
