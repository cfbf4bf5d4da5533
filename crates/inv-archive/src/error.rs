//! Error types for session packages.

use inv_persistence::{BlobError, PersistenceError};
use thiserror::Error;

/// Errors that can occur while exporting or restoring a session package.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The package is not a usable session package.
    #[error("Malformed session package: {reason}")]
    MalformedArchive { reason: String },

    /// Zip encoding or decoding failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Reading or writing an entry failed.
    #[error("Failed to {operation} package entry '{entry}'")]
    Io {
        operation: &'static str,
        entry: String,
        #[source]
        source: std::io::Error,
    },

    /// The session snapshot could not be encoded.
    #[error("Failed to encode session snapshot")]
    Serialization(#[from] serde_json::Error),

    /// A blob could not be read or rehydrated.
    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    /// The restored snapshot could not be stored.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ArchiveError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedArchive {
            reason: reason.into(),
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedArchive { reason } => {
                format!("The file is not a valid session package: {reason}")
            }
            Self::Zip(_) | Self::Io { .. } => "The session package could not be read.".to_string(),
            Self::Serialization(_) => "The session data could not be packaged.".to_string(),
            Self::Blob(e) => e.user_message(),
            Self::Persistence(e) => e.user_message(),
        }
    }
}

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
