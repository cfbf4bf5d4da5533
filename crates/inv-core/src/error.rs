//! Error types for session workflows.

use std::path::PathBuf;

use inv_archive::ArchiveError;
use inv_ingest::IngestError;
use inv_persistence::{BlobError, PersistenceError};
use thiserror::Error;

use crate::assignment::ReassignmentProposal;

/// Why a session operation was refused or failed.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is read-only")]
    ReadOnly,

    #[error("no active custodian")]
    NoActiveCustodian,

    #[error("asset not found: {key}")]
    AssetNotFound { key: String },

    /// The asset belongs to another custodian; confirm or cancel the proposal.
    #[error("asset {} is held by {}", .0.asset_key, .0.from)]
    ReassignmentConflict(ReassignmentProposal),

    #[error("reassignment of {key} is no longer valid")]
    StaleProposal { key: String },

    #[error("an import is already running")]
    ImportInProgress,

    #[error("file already loaded: {file_name}")]
    DuplicateSourceFile { file_name: String },

    #[error("unknown verifier: {number}")]
    UnknownVerifier { number: String },

    #[error("not logged in")]
    NotLoggedIn,

    #[error("photo too large: {size} bytes (limit {limit})")]
    PhotoTooLarge { size: usize, limit: usize },

    #[error("custodian not found: {name}")]
    CustodianNotFound { name: String },

    #[error("custodian already exists: {name}")]
    CustodianExists { name: String },

    #[error("custodian {name} still holds {assets} assets")]
    CustodianHasAssets { name: String, assets: usize },

    #[error("additional item not found: {id}")]
    AdditionalNotFound { id: String },

    #[error("unknown area: {area}")]
    AreaNotFound { area: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("cannot write report: {0}")]
    Report(#[from] csv::Error),
}

impl SessionError {
    /// Message suitable for showing to the auditor.
    pub fn user_message(&self) -> String {
        match self {
            Self::ReadOnly => {
                "La sesión está en modo de solo lectura. Exporte un respaldo y reinicie.".to_string()
            }
            Self::NoActiveCustodian => {
                "Debe activar un usuario para poder ubicar o re-etiquetar bienes.".to_string()
            }
            Self::AssetNotFound { key } => format!("No se encontró el bien {key}."),
            Self::ReassignmentConflict(proposal) => format!(
                "El bien {} está asignado a {}. ¿Reasignarlo a {}?",
                proposal.asset_key, proposal.from, proposal.to
            ),
            Self::StaleProposal { key } => {
                format!("La asignación del bien {key} cambió; vuelva a intentarlo.")
            }
            Self::ImportInProgress => "Ya hay una carga de archivo en curso.".to_string(),
            Self::DuplicateSourceFile { file_name } => {
                format!("El archivo \"{file_name}\" ya fue cargado.")
            }
            Self::UnknownVerifier { .. } => "Número de empleado no autorizado.".to_string(),
            Self::NotLoggedIn => "Inicie sesión para continuar.".to_string(),
            Self::PhotoTooLarge { .. } => "La imagen es demasiado grande.".to_string(),
            Self::CustodianNotFound { name } => format!("No existe el usuario {name}."),
            Self::CustodianExists { name } => format!("El usuario {name} ya está registrado."),
            Self::CustodianHasAssets { name, assets } => {
                format!("{name} tiene {assets} bienes asignados; des-ubíquelos primero.")
            }
            Self::AdditionalNotFound { .. } => "No se encontró el bien adicional.".to_string(),
            Self::AreaNotFound { area } => format!("No existe el área {area}."),
            Self::Persistence(e) => e.user_message(),
            Self::Blob(e) => e.user_message(),
            Self::Ingest(e) => e.user_message(),
            Self::Archive(e) => e.user_message(),
            Self::Report(_) => "No se pudo generar el reporte.".to_string(),
        }
    }

    /// Whether the caller can resolve this by asking the user to confirm.
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            Self::ReassignmentConflict(_) | Self::DuplicateSourceFile { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
