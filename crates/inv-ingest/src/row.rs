//! Sheet rows and asset-key validation.

use std::sync::LazyLock;

use regex::Regex;

/// Institutional key: five or six digits, or a `0.` fraction.
static ASSET_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{5,6}|0\.\d+)$").expect("Invalid asset key regex"));

/// Column positions of an asset list row.
pub mod column {
    pub const KEY: usize = 0;
    pub const DESCRIPTION: usize = 1;
    pub const OFFICE: usize = 2;
    pub const TYPE: usize = 3;
    pub const BRAND: usize = 4;
    pub const MODEL: usize = 5;
    pub const SERIAL: usize = 6;
}

/// One spreadsheet row as ordered, already-stringified cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    cells: Vec<String>,
}

impl SheetRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell text at `index`; missing cells read as empty.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }

    /// The trimmed key cell, if it is a valid asset key.
    pub fn asset_key(&self) -> Option<&str> {
        let key = self.cell(column::KEY).trim();
        is_valid_asset_key(key).then_some(key)
    }
}

impl<S: Into<String>> FromIterator<S> for SheetRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Whether `raw` (after trimming) is an institutional asset key.
///
/// ```
/// use inv_ingest::is_valid_asset_key;
///
/// assert!(is_valid_asset_key("12345"));
/// assert!(is_valid_asset_key(" 0.75 "));
/// assert!(!is_valid_asset_key("1234"));
/// assert!(!is_valid_asset_key("CLAVE"));
/// ```
pub fn is_valid_asset_key(raw: &str) -> bool {
    ASSET_KEY_REGEX.is_match(raw.trim())
}
