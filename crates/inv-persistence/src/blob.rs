//! Durable blob store for photos and layout images.
//!
//! Each collection is a directory under the store root and each blob one
//! file named by its key. A `VERSION` file records the schema; opening a
//! store only ever adds missing collections.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{BlobError, BlobResult};

/// Schema version written by this release.
pub const BLOB_SCHEMA_VERSION: u32 = 2;

const VERSION_FILE: &str = "VERSION";

/// Named blob collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Evidence photos of assets and locations.
    Photos,
    /// Background images of the site layout editor.
    LayoutImages,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Photos, Collection::LayoutImages];

    /// Directory name, also used as the folder name in session packages.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::LayoutImages => "layoutImages",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Keys are plain file names: no separators, no leading dot.
pub fn validate_key(key: &str) -> BlobResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.contains(['/', '\\', '\0'])
        && key.trim() == key;
    if valid {
        Ok(())
    } else {
        Err(BlobError::InvalidKey {
            key: key.to_string(),
        })
    }
}

#[derive(Debug)]
struct Shared {
    root: PathBuf,
    open: AtomicBool,
}

/// Cloneable handle to an on-disk blob store.
///
/// All clones share one open flag: after [`invalidate`](Self::invalidate)
/// every operation on every clone fails with
/// [`BlobError::NotInitialized`] until [`reopen`](Self::reopen) succeeds.
#[derive(Debug, Clone)]
pub struct BlobStore {
    shared: Arc<Shared>,
}

impl BlobStore {
    /// Open (or create) the store at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let store = Self {
            shared: Arc::new(Shared {
                root: root.into(),
                open: AtomicBool::new(false),
            }),
        };
        store.reopen().await?;
        Ok(store)
    }

    /// Re-run the schema upgrade and mark the handle usable again.
    pub async fn reopen(&self) -> BlobResult<()> {
        let root = &self.shared.root;
        let version_path = root.join(VERSION_FILE);

        match tokio::fs::read_to_string(&version_path).await {
            Ok(text) => {
                let found = text.trim().parse::<u32>().unwrap_or(0);
                if found > BLOB_SCHEMA_VERSION {
                    self.invalidate();
                    return Err(BlobError::VersionConflict {
                        found,
                        supported: BLOB_SCHEMA_VERSION,
                    });
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error("read", version_path, e)),
        }

        for collection in Collection::ALL {
            let dir = root.join(collection.dir_name());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| io_error("create", dir, e))?;
        }

        tokio::fs::write(&version_path, BLOB_SCHEMA_VERSION.to_string())
            .await
            .map_err(|e| io_error("write", version_path, e))?;

        self.shared.open.store(true, Ordering::SeqCst);
        tracing::debug!(root = %root.display(), version = BLOB_SCHEMA_VERSION, "opened blob store");
        Ok(())
    }

    /// Close the handle, e.g. when another process upgrades the schema.
    pub fn invalidate(&self) {
        if self.shared.open.swap(false, Ordering::SeqCst) {
            tracing::warn!(root = %self.shared.root.display(), "blob store handle invalidated");
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    fn blob_path(&self, collection: Collection, key: &str) -> BlobResult<PathBuf> {
        if !self.is_open() {
            return Err(BlobError::NotInitialized);
        }
        validate_key(key)?;
        Ok(self.shared.root.join(collection.dir_name()).join(key))
    }

    /// Store `bytes` under `key`, replacing any previous blob.
    pub async fn put(&self, collection: Collection, key: &str, bytes: &[u8]) -> BlobResult<()> {
        let path = self.blob_path(collection, key)?;
        let temp_path = path.with_file_name(format!(".{key}.tmp"));

        tokio::fs::write(&temp_path, bytes)
            .await
            .map_err(|e| io_error("write", temp_path.clone(), e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| io_error("replace", path.clone(), e))?;

        tracing::debug!(%collection, key, bytes = bytes.len(), "stored blob");
        Ok(())
    }

    /// Read a blob; `None` when the key is absent.
    pub async fn get(&self, collection: Collection, key: &str) -> BlobResult<Option<Vec<u8>>> {
        let path = self.blob_path(collection, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", path, e)),
        }
    }

    /// Delete a blob. Deleting a missing key is not an error.
    pub async fn delete(&self, collection: Collection, key: &str) -> BlobResult<()> {
        let path = self.blob_path(collection, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", path, e)),
        }
    }

    /// Keys of a collection, sorted.
    pub async fn keys(&self, collection: Collection) -> BlobResult<Vec<String>> {
        if !self.is_open() {
            return Err(BlobError::NotInitialized);
        }
        let dir = self.shared.root.join(collection.dir_name());
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| io_error("list", dir.clone(), e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list", dir.clone(), e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_key(&name).is_ok() {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Every blob of a collection as `(key, bytes)`, ordered by key.
    pub async fn list_all(&self, collection: Collection) -> BlobResult<Vec<(String, Vec<u8>)>> {
        let mut blobs = Vec::new();
        for key in self.keys(collection).await? {
            if let Some(bytes) = self.get(collection, &key).await? {
                blobs.push((key, bytes));
            }
        }
        Ok(blobs)
    }

    /// Remove every blob of every collection, keeping the store open.
    pub async fn clear_all(&self) -> BlobResult<()> {
        for collection in Collection::ALL {
            for key in self.keys(collection).await? {
                self.delete(collection, &key).await?;
            }
        }
        tracing::info!(root = %self.shared.root.display(), "cleared blob store");
        Ok(())
    }
}

fn io_error(operation: &'static str, path: PathBuf, source: std::io::Error) -> BlobError {
    BlobError::Io {
        operation,
        path,
        source,
    }
}
