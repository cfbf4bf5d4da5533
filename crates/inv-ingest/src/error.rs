//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading an asset list.
///
/// Rows with an invalid key are not errors; they are skipped and counted in
/// the import summary.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The workbook could not be parsed at all.
    #[error("malformed sheet '{source_file}': {reason}")]
    MalformedSheet { source_file: String, reason: String },

    /// Failed to read the sheet file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a CSV export of the sheet.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl IngestError {
    pub fn malformed(source_file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSheet {
            source_file: source_file.into(),
            reason: reason.into(),
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedSheet { source_file, .. } => {
                format!("'{source_file}' is not a valid inventory list.")
            }
            Self::FileRead { path, .. } | Self::CsvParse { path, .. } => {
                format!("Could not read the inventory list at {}", path.display())
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
