//! Portable session packages.
//!
//! A package is a zip file carrying everything needed to move a session to
//! another device or keep it as evidence:
//!
//! ```text
//! inventario-backup-2024-05-01.zip
//! ├── session.json        session snapshot
//! ├── photos/<key>        evidence photos
//! ├── layoutImages/<key>  layout editor images
//! └── manifest.json       SHA-256 of every entry (optional on restore)
//! ```
//!
//! Final packages carry a read-only snapshot. Restoring writes the blobs
//! first and swaps the snapshot last; a failure in either step rolls the
//! blob store back.

mod error;
mod export;
mod manifest;
mod restore;

pub use error::{ArchiveError, Result};
pub use export::{
    ExportKind, ExportedPackage, SESSION_ENTRY, export_package, package_snapshot, write_package,
};
pub use manifest::{MANIFEST_ENTRY, MANIFEST_VERSION, PackageManifest, sha256_hex};
pub use restore::{RestoreSummary, SessionPackage, read_package, restore_package};
