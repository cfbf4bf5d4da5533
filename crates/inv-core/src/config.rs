//! Engine configuration, persisted as TOML in the user's config directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use inv_ingest::DEFAULT_CHUNK_SIZE;
use inv_model::{ACTIVITY_LOG_CAPACITY, Verifier};
use inv_persistence::{AutoSaveConfig, SNAPSHOT_KEY};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LogConfig;

// =============================================================================
// ROOT CONFIG
// =============================================================================

/// Everything the host can tune about a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub storage: StorageConfig,
    pub autosave: AutoSaveConfig,
    pub import: ImportConfig,
    pub auth: AuthConfig,
    pub logging: LogConfig,
}

impl InventoryConfig {
    /// Load from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("mx", "InventarioPro", "Inventario")
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Where snapshots and blobs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for snapshot files. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,

    pub snapshot_key: String,

    /// Blob store root. Defaults to `<data_dir>/blobs`.
    pub blob_dir: Option<PathBuf>,

    /// Byte limit for one snapshot, if any.
    pub quota_bytes: Option<u64>,

    pub activity_log_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            snapshot_key: SNAPSHOT_KEY.to_string(),
            blob_dir: None,
            quota_bytes: None,
            activity_log_capacity: ACTIVITY_LOG_CAPACITY,
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("inventario-data"))
        })
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("blobs"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Rows converted between yields to the runtime.
    pub chunk_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Allow-listed verifiers, employee number -> name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub verifiers: BTreeMap<String, String>,
}

impl AuthConfig {
    #[must_use]
    pub fn with_verifier(mut self, number: impl Into<String>, name: impl Into<String>) -> Self {
        self.verifiers.insert(number.into(), name.into());
        self
    }

    /// Look up an employee number (surrounding whitespace ignored).
    pub fn verifier(&self, number: &str) -> Option<Verifier> {
        let number = number.trim();
        self.verifiers
            .get(number)
            .map(|name| Verifier::new(number, name.clone()))
    }
}
