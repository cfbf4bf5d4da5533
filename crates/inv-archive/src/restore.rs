//! Reading and restoring session packages.

use std::io::{Cursor, Read};

use inv_model::SessionState;
use inv_persistence::{BlobStore, Collection, StateStore};

use crate::error::{ArchiveError, Result};
use crate::export::SESSION_ENTRY;
use crate::manifest::{MANIFEST_ENTRY, PackageManifest};

/// The decoded contents of a package.
#[derive(Debug, Clone)]
pub struct SessionPackage {
    /// Raw `session.json`, validated to parse as a session.
    pub snapshot: String,
    pub state: SessionState,
    pub photos: Vec<(String, Vec<u8>)>,
    pub layout_images: Vec<(String, Vec<u8>)>,
    pub manifest: Option<PackageManifest>,
}

/// What a restore wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub photos: usize,
    pub layout_images: usize,
    pub read_only: bool,
}

fn collection_for(folder: &str) -> Option<Collection> {
    Collection::ALL
        .into_iter()
        .find(|collection| collection.dir_name() == folder)
}

/// Decode a package without touching any store.
///
/// Entries outside `session.json`, `manifest.json` and the two blob folders
/// are ignored.
pub fn read_package(bytes: &[u8]) -> Result<SessionPackage> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ArchiveError::malformed(format!("not a zip file: {e}")))?;

    let mut snapshot = None;
    let mut manifest_bytes = None;
    let mut photos = Vec::new();
    let mut layout_images = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content).map_err(|e| ArchiveError::Io {
            operation: "read",
            entry: name.clone(),
            source: e,
        })?;

        match name.as_str() {
            SESSION_ENTRY => snapshot = Some(content),
            MANIFEST_ENTRY => manifest_bytes = Some(content),
            _ => {
                let Some((folder, key)) = name.rsplit_once('/') else {
                    continue;
                };
                let folder = folder.rsplit('/').next().unwrap_or(folder);
                match collection_for(folder) {
                    Some(Collection::Photos) if !key.is_empty() => {
                        photos.push((key.to_string(), content));
                    }
                    Some(Collection::LayoutImages) if !key.is_empty() => {
                        layout_images.push((key.to_string(), content));
                    }
                    _ => tracing::debug!(entry = %name, "ignoring package entry"),
                }
            }
        }
    }

    let snapshot = snapshot.ok_or_else(|| ArchiveError::malformed("missing session.json"))?;
    let snapshot = String::from_utf8(snapshot)
        .map_err(|_| ArchiveError::malformed("session.json is not UTF-8"))?;
    let state: SessionState = serde_json::from_str(&snapshot)
        .map_err(|e| ArchiveError::malformed(format!("session.json: {e}")))?;

    let manifest = manifest_bytes
        .map(|raw| serde_json::from_slice::<PackageManifest>(&raw))
        .transpose()
        .map_err(|e| ArchiveError::malformed(format!("manifest.json: {e}")))?;

    if let Some(manifest) = &manifest {
        manifest.verify(SESSION_ENTRY, snapshot.as_bytes())?;
        for (collection, blobs) in [
            (Collection::Photos, &photos),
            (Collection::LayoutImages, &layout_images),
        ] {
            for (key, content) in blobs {
                manifest.verify(&format!("{}/{key}", collection.dir_name()), content)?;
            }
        }
    }

    photos.sort_by(|a, b| a.0.cmp(&b.0));
    layout_images.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(SessionPackage {
        snapshot,
        state,
        photos,
        layout_images,
        manifest,
    })
}

/// A blob overwritten during rehydration and its previous content.
struct Written {
    collection: Collection,
    key: String,
    previous: Option<Vec<u8>>,
}

async fn rollback(blobs: &BlobStore, written: Vec<Written>) {
    for entry in written.into_iter().rev() {
        let result = match entry.previous {
            Some(bytes) => blobs.put(entry.collection, &entry.key, &bytes).await,
            None => blobs.delete(entry.collection, &entry.key).await,
        };
        if let Err(e) = result {
            tracing::warn!(key = %entry.key, error = %e, "could not roll back restored blob");
        }
    }
}

async fn rehydrate(blobs: &BlobStore, package: &SessionPackage) -> Result<Vec<Written>> {
    let mut written = Vec::new();
    for (collection, entries) in [
        (Collection::Photos, &package.photos),
        (Collection::LayoutImages, &package.layout_images),
    ] {
        for (key, bytes) in entries {
            let step = async {
                let previous = blobs.get(collection, key).await?;
                blobs.put(collection, key, bytes).await?;
                Ok::<_, ArchiveError>(previous)
            };
            match step.await {
                Ok(previous) => written.push(Written {
                    collection,
                    key: key.clone(),
                    previous,
                }),
                Err(e) => {
                    rollback(blobs, written).await;
                    return Err(e);
                }
            }
        }
    }
    Ok(written)
}

/// Restore a package: blobs first, then the snapshot.
///
/// Any failure rolls the blob store back and leaves the current session
/// untouched.
pub async fn restore_package(
    store: &mut StateStore,
    blobs: &BlobStore,
    bytes: &[u8],
) -> Result<RestoreSummary> {
    let package = read_package(bytes)?;
    let written = rehydrate(blobs, &package).await?;

    if let Err(e) = store.replace_snapshot(&package.snapshot) {
        rollback(blobs, written).await;
        return Err(e.into());
    }

    let summary = RestoreSummary {
        photos: package.photos.len(),
        layout_images: package.layout_images.len(),
        read_only: store.is_read_only(),
    };
    tracing::info!(
        photos = summary.photos,
        layout_images = summary.layout_images,
        read_only = summary.read_only,
        "restored session package"
    );
    Ok(summary)
}
