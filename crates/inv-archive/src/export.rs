//! Writing session packages.

use std::io::{Cursor, Write};

use chrono::{DateTime, NaiveDate, Utc};
use inv_model::SessionState;
use inv_persistence::{BlobStore, Collection};
use serde::{Deserialize, Serialize};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::{ArchiveError, Result};
use crate::manifest::{MANIFEST_ENTRY, PackageManifest};

/// Snapshot entry name inside the zip.
pub const SESSION_ENTRY: &str = "session.json";

/// Why a package is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// Routine backup; restores as an editable session.
    Backup,
    /// Closing package; restores as a read-only session.
    Final,
}

impl ExportKind {
    /// Label used in the package file name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Final => "FINALIZADO",
        }
    }

    /// `inventario-{label}-{date}.zip`
    pub fn file_name(self, date: NaiveDate) -> String {
        format!("inventario-{}-{}.zip", self.label(), date.format("%Y-%m-%d"))
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A finished package, ready to hand to the user.
#[derive(Debug, Clone)]
pub struct ExportedPackage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub photos: usize,
    pub layout_images: usize,
}

/// Snapshot text as packaged: final packages are marked read-only.
pub fn package_snapshot(state: &SessionState, kind: ExportKind) -> Result<String> {
    if kind == ExportKind::Final && !state.read_only {
        let mut state = state.clone();
        state.read_only = true;
        return Ok(serde_json::to_string(&state)?);
    }
    Ok(serde_json::to_string(state)?)
}

fn entry_path(collection: Collection, key: &str) -> String {
    format!("{}/{key}", collection.dir_name())
}

/// Encode a package from already-collected parts.
pub fn write_package(
    snapshot: &str,
    photos: &[(String, Vec<u8>)],
    layout_images: &[(String, Vec<u8>)],
    kind: ExportKind,
    created_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // Photos are already compressed images.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut manifest = PackageManifest::new(kind, created_at);

    write_entry(&mut writer, SESSION_ENTRY, snapshot.as_bytes(), deflated)?;
    manifest.record(SESSION_ENTRY, snapshot.as_bytes());

    for (collection, blobs) in [
        (Collection::Photos, photos),
        (Collection::LayoutImages, layout_images),
    ] {
        for (key, bytes) in blobs {
            let path = entry_path(collection, key);
            write_entry(&mut writer, &path, bytes, stored)?;
            manifest.record(&path, bytes);
        }
    }

    let manifest_json = serde_json::to_vec_pretty(&manifest)?;
    write_entry(&mut writer, MANIFEST_ENTRY, &manifest_json, deflated)?;

    Ok(writer.finish()?.into_inner())
}

fn write_entry(
    writer: &mut zip::ZipWriter<Cursor<Vec<u8>>>,
    path: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    writer.start_file(path, options)?;
    writer.write_all(bytes).map_err(|e| ArchiveError::Io {
        operation: "write",
        entry: path.to_string(),
        source: e,
    })
}

/// Package the session and every stored blob.
pub async fn export_package(
    state: &SessionState,
    blobs: &BlobStore,
    kind: ExportKind,
) -> Result<ExportedPackage> {
    let snapshot = package_snapshot(state, kind)?;
    let photos = blobs.list_all(Collection::Photos).await?;
    let layout_images = blobs.list_all(Collection::LayoutImages).await?;

    let now = Utc::now();
    let bytes = write_package(&snapshot, &photos, &layout_images, kind, now)?;
    let file_name = kind.file_name(now.date_naive());

    tracing::info!(
        %kind,
        file_name = %file_name,
        photos = photos.len(),
        layout_images = layout_images.len(),
        bytes = bytes.len(),
        "exported session package"
    );

    Ok(ExportedPackage {
        file_name,
        bytes,
        photos: photos.len(),
        layout_images: layout_images.len(),
    })
}
