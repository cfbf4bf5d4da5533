//! Organizational areas assets originate from.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Area id used when a sheet's area label carries no `AREA <n>` marker.
pub const UNKNOWN_AREA: &str = "Sin Área";

/// Area marker inside a sheet's area label, e.g. `"AREA 12 DIRECCION"`.
static AREA_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AREA\s(\d+)").expect("Invalid area id regex"));

/// Extract the numeric area id from a sheet's area label.
///
/// ```
/// use inv_model::area_id_from_label;
///
/// assert_eq!(area_id_from_label("AREA 12 DIRECCION GENERAL"), "12");
/// assert_eq!(area_id_from_label("Bodega"), "Sin Área");
/// ```
pub fn area_id_from_label(label: &str) -> String {
    AREA_ID_REGEX
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| UNKNOWN_AREA.to_string(), |m| m.as_str().to_string())
}

/// Responsible person recorded for an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDirectoryEntry {
    /// Full area label as printed on the source sheet.
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_id_requires_single_space() {
        assert_eq!(area_id_from_label("AREA 7"), "7");
        assert_eq!(area_id_from_label("AREA-7"), UNKNOWN_AREA);
        assert_eq!(area_id_from_label(""), UNKNOWN_AREA);
    }
}
