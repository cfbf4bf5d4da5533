//! Tabular exports: the inventory listing and the pending-label sheet.
//!
//! Reports are computed from a session snapshot and written as CSV; the
//! host decides where the bytes go.

use std::collections::BTreeSet;
use std::io::Write;

use inv_model::{AdditionalItem, Asset, LocatedStatus, SessionState};
use serde::Serialize;

use crate::error::Result;

/// Shown when no location can be resolved for an asset.
pub const UNKNOWN_LOCATION: &str = "N/A";

/// Shown for additional items with neither key nor serial.
pub const NO_IDENTIFIER: &str = "S/N";

pub const LABELS_FILE_NAME: &str = "etiquetas_pendientes.csv";

// =============================================================================
// INVENTORY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRow {
    #[serde(rename = "Clave")]
    pub key: String,
    #[serde(rename = "Descripción")]
    pub description: String,
    #[serde(rename = "Marca")]
    pub brand: String,
    #[serde(rename = "Modelo")]
    pub model: String,
    #[serde(rename = "Serie")]
    pub serial: String,
    #[serde(rename = "Usuario")]
    pub custodian: String,
    #[serde(rename = "Ubicación")]
    pub location: String,
    #[serde(rename = "Ubicado")]
    pub status: LocatedStatus,
    #[serde(rename = "Nota")]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionalRow {
    #[serde(rename = "Descripción")]
    pub description: String,
    /// Key, else serial, else [`NO_IDENTIFIER`].
    #[serde(rename = "Clave/Serie")]
    pub identifier: String,
    #[serde(rename = "Usuario")]
    pub custodian: String,
    #[serde(rename = "Es Personal")]
    pub personal: bool,
}

/// The inventory export, optionally limited to one area.
///
/// Assets are filtered by origin area. Additional items have no area of
/// their own and follow the home area of their custodian.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryReport {
    pub area: Option<String>,
    pub inventory: Vec<InventoryRow>,
    pub additional: Vec<AdditionalRow>,
}

impl InventoryReport {
    pub fn compute(state: &SessionState, area: Option<&str>) -> Self {
        let inventory = state
            .inventory
            .iter()
            .filter(|asset| area.is_none_or(|area| asset.origin_area == area))
            .map(|asset| InventoryRow {
                key: asset.key.clone(),
                description: asset.description.clone(),
                brand: asset.brand.clone(),
                model: asset.model.clone(),
                serial: asset.serial.clone(),
                custodian: asset.custodian.clone(),
                location: resolve_location(state, asset),
                status: asset.status,
                note: state.notes.get(&asset.key).cloned().unwrap_or_default(),
            })
            .collect();

        let area_custodians: Option<BTreeSet<&str>> = area.map(|area| {
            state
                .custodians
                .iter()
                .filter(|custodian| custodian.area == area)
                .map(|custodian| custodian.name.as_str())
                .collect()
        });
        let additional = state
            .additional_items
            .iter()
            .filter(|item| {
                area_custodians
                    .as_ref()
                    .is_none_or(|names| names.contains(item.custodian.as_str()))
            })
            .map(additional_row)
            .collect();

        Self {
            area: area.map(str::to_string),
            inventory,
            additional,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty() && self.additional.is_empty()
    }

    /// `inventario_completo.csv`, or `inventario_area_<area>.csv` when filtered.
    pub fn file_name(&self) -> String {
        match &self.area {
            Some(area) => format!("inventario_area_{area}.csv"),
            None => "inventario_completo.csv".to_string(),
        }
    }

    pub fn write_inventory_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_rows(writer, &self.inventory)
    }

    pub fn write_additional_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_rows(writer, &self.additional)
    }
}

/// Where an asset is reported to be.
///
/// The asset's own location wins; otherwise the custodian's numbered
/// location, then the custodian's area.
pub fn resolve_location(state: &SessionState, asset: &Asset) -> String {
    if let Some(location) = asset.location_override.as_deref().filter(|l| !l.is_empty()) {
        return location.to_string();
    }
    state
        .custodian(&asset.custodian)
        .and_then(|custodian| {
            custodian
                .location_with_id
                .as_deref()
                .filter(|l| !l.is_empty())
                .or_else(|| Some(custodian.area.as_str()).filter(|a| !a.is_empty()))
        })
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

fn additional_row(item: &AdditionalItem) -> AdditionalRow {
    let identifier = [item.key.as_deref(), item.serial.as_deref()]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or(NO_IDENTIFIER);
    AdditionalRow {
        description: item.description.clone(),
        identifier: identifier.to_string(),
        custodian: item.custodian.clone(),
        personal: item.personal,
    }
}

// =============================================================================
// LABELS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRow {
    #[serde(rename = "Clave")]
    pub key: String,
    #[serde(rename = "Descripción")]
    pub description: String,
    #[serde(rename = "Usuario")]
    pub custodian: String,
}

/// Labels to print: assets flagged for reprint, then additional items that
/// were given an institutional key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReport {
    pub rows: Vec<LabelRow>,
}

impl LabelReport {
    pub fn compute(state: &SessionState) -> Self {
        let assets = state
            .inventory
            .iter()
            .filter(|asset| asset.reprint_label)
            .map(|asset| LabelRow {
                key: asset.key.clone(),
                description: asset.description.clone(),
                custodian: asset.custodian.clone(),
            });
        let additional = state.additional_items.iter().filter_map(|item| {
            let key = item.assigned_key.as_deref().filter(|k| !k.is_empty())?;
            Some(LabelRow {
                key: key.to_string(),
                description: item.description.clone(),
                custodian: item.custodian.clone(),
            })
        });

        Self {
            rows: assets.chain(additional).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_rows(writer, &self.rows)
    }
}

fn write_rows<W: Write, R: Serialize>(writer: W, rows: &[R]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}
