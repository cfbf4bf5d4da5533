//! Institutional asset records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::{lenient_opt_string, lenient_string, yes_no};

/// Whether an asset has been physically found during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocatedStatus {
    #[default]
    #[serde(rename = "NO")]
    NotLocated,
    #[serde(rename = "SI")]
    Located,
}

impl LocatedStatus {
    #[inline]
    pub fn is_located(self) -> bool {
        matches!(self, Self::Located)
    }
}

/// An asset loaded from an institutional inventory list.
///
/// The unique key is the business identity and stays stable across
/// re-imports of the same source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique institutional key (5-6 digits or a `0.xxx` fraction).
    #[serde(rename = "CLAVE UNICA", deserialize_with = "lenient_string")]
    pub key: String,

    #[serde(rename = "DESCRIPCION", default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Office/document reference column of the source list.
    #[serde(rename = "OFICIO", default, deserialize_with = "lenient_string")]
    pub office: String,

    #[serde(rename = "TIPO", default, deserialize_with = "lenient_string")]
    pub asset_type: String,

    #[serde(rename = "MARCA", default, deserialize_with = "lenient_string")]
    pub brand: String,

    #[serde(rename = "MODELO", default, deserialize_with = "lenient_string")]
    pub model: String,

    #[serde(rename = "SERIE", default, deserialize_with = "lenient_string")]
    pub serial: String,

    /// Custodian the asset was located under. Empty when not located.
    #[serde(rename = "NOMBRE DE USUARIO", default, deserialize_with = "lenient_string")]
    pub custodian: String,

    #[serde(rename = "UBICADO", default)]
    pub status: LocatedStatus,

    #[serde(rename = "IMPRIMIR ETIQUETA", default, with = "yes_no")]
    pub reprint_label: bool,

    /// List type ("libro") declared by the source sheet.
    #[serde(rename = "listadoOriginal", default, deserialize_with = "lenient_string")]
    pub list_type: String,

    #[serde(rename = "areaOriginal", default, deserialize_with = "lenient_string")]
    pub origin_area: String,

    /// Import batch identifier shared by every row of one import.
    #[serde(rename = "listId", default)]
    pub list_id: i64,

    #[serde(rename = "fileName", default, deserialize_with = "lenient_string")]
    pub source_file: String,

    #[serde(rename = "printDate", default, deserialize_with = "lenient_opt_string")]
    pub print_date: Option<String>,

    #[serde(rename = "fechaUbicado", default)]
    pub located_at: Option<DateTime<Utc>>,

    /// True when located under a custodian of a different area.
    #[serde(rename = "areaIncorrecta", default)]
    pub area_mismatch: bool,

    /// Location that takes precedence over the custodian's registered one.
    #[serde(rename = "ubicacionEspecifica", default, deserialize_with = "lenient_opt_string")]
    pub location_override: Option<String>,
}

impl Asset {
    /// Create a not-located asset with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: String::new(),
            office: String::new(),
            asset_type: String::new(),
            brand: String::new(),
            model: String::new(),
            serial: String::new(),
            custodian: String::new(),
            status: LocatedStatus::NotLocated,
            reprint_label: false,
            list_type: String::new(),
            origin_area: String::new(),
            list_id: 0,
            source_file: String::new(),
            print_date: None,
            located_at: None,
            area_mismatch: false,
            location_override: None,
        }
    }

    #[inline]
    pub fn is_located(&self) -> bool {
        self.status.is_located()
    }

    /// Name of the current custodian, if the asset is located.
    pub fn custodian(&self) -> Option<&str> {
        if self.is_located() && !self.custodian.is_empty() {
            Some(self.custodian.as_str())
        } else {
            None
        }
    }

    /// Mark the asset as located under `custodian`.
    ///
    /// `custodian_area` is the custodian's home area; the area-mismatch flag
    /// is recomputed from it.
    pub fn locate(
        &mut self,
        custodian: &str,
        custodian_area: &str,
        location: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.status = LocatedStatus::Located;
        self.custodian = custodian.to_string();
        self.located_at = Some(at);
        self.area_mismatch = self.origin_area != custodian_area;
        self.location_override = location;
    }

    /// Clear every assignment field.
    pub fn unlocate(&mut self) {
        self.status = LocatedStatus::NotLocated;
        self.custodian.clear();
        self.reprint_label = false;
        self.located_at = None;
        self.area_mismatch = false;
        self.location_override = None;
    }

    /// Case-insensitive match against key, description, brand, model and serial.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            &self.key,
            &self.description,
            &self.brand,
            &self.model,
            &self.serial,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Fields of an [`Asset`] that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetField {
    Description,
    Brand,
    Model,
    Serial,
}

impl AssetField {
    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Description => "DESCRIPCION",
            Self::Brand => "MARCA",
            Self::Model => "MODELO",
            Self::Serial => "SERIE",
        }
    }

    pub fn get(self, asset: &Asset) -> &str {
        match self {
            Self::Description => &asset.description,
            Self::Brand => &asset.brand,
            Self::Model => &asset.model,
            Self::Serial => &asset.serial,
        }
    }

    pub fn set(self, asset: &mut Asset, value: String) {
        match self {
            Self::Description => asset.description = value,
            Self::Brand => asset.brand = value,
            Self::Model => asset.model = value,
            Self::Serial => asset.serial = value,
        }
    }
}

impl std::fmt::Display for AssetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
