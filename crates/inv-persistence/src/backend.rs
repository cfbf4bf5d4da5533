//! Snapshot storage backends.
//!
//! A backend stores opaque snapshot text under a string key. The
//! [`StateStore`](crate::StateStore) owns exactly one backend.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{PersistenceError, Result};

/// Key-value storage for serialized session snapshots.
pub trait SnapshotBackend: fmt::Debug + Send {
    /// Read the snapshot stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the snapshot stored under `key`.
    fn write(&mut self, key: &str, text: &str) -> Result<()>;

    /// Remove the snapshot under `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

fn check_quota(quota: Option<u64>, needed: usize) -> Result<()> {
    match quota {
        Some(quota) if needed as u64 > quota => Err(PersistenceError::QuotaExceeded {
            needed: needed as u64,
            quota,
        }),
        _ => Ok(()),
    }
}

// ============================================================================
// File backend
// ============================================================================

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temp file that is renamed over the target, so a crash
/// mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: None,
        }
    }

    /// Reject snapshots larger than `bytes`.
    #[must_use]
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Io {
                operation: "read",
                path,
                source: e,
            }),
        }
    }

    fn write(&mut self, key: &str, text: &str) -> Result<()> {
        check_quota(self.quota_bytes, text.len())?;

        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(text.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| PersistenceError::Io {
                operation: "write",
                path: temp_path.clone(),
                source: e,
            })?;

        fs::rename(&temp_path, &path).map_err(|e| PersistenceError::Io {
            operation: "replace",
            path: path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "wrote snapshot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::Io {
                operation: "remove",
                path,
                source: e,
            }),
        }
    }
}

// ============================================================================
// Memory backend
// ============================================================================

/// In-memory backend; clones share entries and quota.
///
/// A quota makes writes fail the way a full device does.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota_bytes: Arc<Mutex<Option<u64>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(self, bytes: u64) -> Self {
        self.set_quota(Some(bytes));
        self
    }

    /// Change the quota for every clone of this backend.
    pub fn set_quota(&self, bytes: Option<u64>) {
        *self.quota_bytes.lock().unwrap_or_else(PoisonError::into_inner) = bytes;
    }

    fn quota(&self) -> Option<u64> {
        *self.quota_bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw text currently stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store raw text, bypassing the quota.
    pub fn insert(&self, key: &str, text: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), text.into());
    }
}

impl SnapshotBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, text: &str) -> Result<()> {
        check_quota(self.quota(), text.len())?;
        self.insert(key, text);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
