//! Persistence error types.
//!
//! Snapshot and blob operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Snapshot persistence error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend's storage quota would be exceeded by this write.
    #[error("Storage quota exceeded ({needed} bytes needed, {quota} available)")]
    QuotaExceeded { needed: u64, quota: u64 },

    /// Snapshot (de)serialization error.
    #[error("Failed to serialize session snapshot")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// A save failed; the store has switched to read-only mode.
    #[error("Failed to persist session snapshot '{key}'")]
    PersistenceFailure {
        key: String,
        #[source]
        source: Box<PersistenceError>,
    },

    /// The store is read-only and refuses to write.
    #[error("Session is read-only")]
    ReadOnly,
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::QuotaExceeded { .. } => {
                "The device storage is full; the session could not be saved.".to_string()
            }
            Self::Serialization { .. } => {
                "An error occurred while encoding the session data.".to_string()
            }
            Self::PersistenceFailure { source, .. } => {
                format!(
                    "Saving failed and the session is now read-only. {}",
                    source.user_message()
                )
            }
            Self::ReadOnly => {
                "The session is read-only; changes can no longer be saved.".to_string()
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the storage directory exists and is readable.".into())
                } else {
                    Some("Check that you have permission to write to the storage directory.".into())
                }
            }
            Self::QuotaExceeded { .. } | Self::PersistenceFailure { .. } | Self::ReadOnly => {
                Some("Export a session package to keep your work, then start a new session.".into())
            }
            Self::Serialization { .. } => None,
        }
    }
}

/// Blob store error.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The store has not been opened or its handle was invalidated.
    #[error("Blob store is not initialized")]
    NotInitialized,

    /// The store on disk was written by a newer schema.
    #[error("Blob store version {found} is not supported (maximum: {supported})")]
    VersionConflict { found: u32, supported: u32 },

    /// Keys must be plain file names.
    #[error("Invalid blob key: {key:?}")]
    InvalidKey { key: String },

    /// File I/O error.
    #[error("Failed to {operation} blob: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotInitialized => "The photo store is not available.".to_string(),
            Self::VersionConflict { .. } => {
                "The photo store was upgraded by a newer version of the application.".to_string()
            }
            Self::InvalidKey { key } => format!("'{key}' is not a valid photo name."),
            Self::Io { path, .. } => format!("Could not access the photo at {}", path.display()),
        }
    }
}

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Result type alias for blob operations.
pub type BlobResult<T> = std::result::Result<T, BlobError>;
