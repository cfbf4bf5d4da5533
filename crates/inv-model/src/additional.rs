//! Assets found during the audit that are not on any institutional list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wire::{lenient_opt_string, lenient_string, si_no};

/// An additional (unlisted) asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(rename = "descripcion", default, deserialize_with = "lenient_string")]
    pub description: String,

    #[serde(rename = "clave", default, deserialize_with = "lenient_opt_string")]
    pub key: Option<String>,

    #[serde(rename = "marca", default, deserialize_with = "lenient_string")]
    pub brand: String,

    #[serde(rename = "modelo", default, deserialize_with = "lenient_string")]
    pub model: String,

    #[serde(rename = "serie", default, deserialize_with = "lenient_opt_string")]
    pub serial: Option<String>,

    /// Custodian the item was registered under.
    #[serde(rename = "usuario", default, deserialize_with = "lenient_string")]
    pub custodian: String,

    /// Personally-owned property (requires regularization).
    #[serde(default, with = "si_no")]
    pub personal: bool,

    /// Entry form received for a personal item.
    #[serde(rename = "tieneFormatoEntrada", default)]
    pub has_entry_form: bool,

    /// Institutional key assigned during regularization.
    #[serde(rename = "claveAsignada", default, deserialize_with = "lenient_opt_string")]
    pub assigned_key: Option<String>,

    #[serde(rename = "fechaRegistro", default)]
    pub registered_at: Option<DateTime<Utc>>,
}

impl AdditionalItem {
    /// Create an item with a fresh identity.
    pub fn new(description: impl Into<String>, custodian: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            key: None,
            brand: String::new(),
            model: String::new(),
            serial: None,
            custodian: custodian.into(),
            personal: false,
            has_entry_form: false,
            assigned_key: None,
            registered_at: Some(Utc::now()),
        }
    }

    /// Personal items still waiting for their entry form.
    pub fn needs_regularization(&self) -> bool {
        self.personal && !self.has_entry_form
    }

    /// Values that participate in duplicate detection.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        [
            self.serial.as_deref(),
            self.key.as_deref(),
            self.assigned_key.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}
