//! Import requests and the fixed layout of institutional asset lists.

use inv_model::{UNKNOWN_AREA, area_id_from_label};

use crate::error::{IngestError, Result};
use crate::row::SheetRow;

/// List type recorded when the sheet declares none.
pub const DEFAULT_LIST_TYPE: &str = "Sin Tipo";

/// Fixed cell positions of the institutional list layout (zero-based).
pub mod layout {
    /// First data row; everything above is the printed header block.
    pub const DATA_START_ROW: usize = 11;
    /// `A10`: area label, e.g. `"AREA 12 DIRECCION GENERAL"`.
    pub const AREA_LABEL: (usize, usize) = (9, 0);
    /// `B7`, falling back to `L7`: list type.
    pub const LIST_TYPE: [(usize, usize); 2] = [(6, 1), (6, 11)];
}

/// Person signing the list for its area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Responsible {
    pub name: String,
    pub title: String,
}

/// One spreadsheet to merge into the session.
///
/// Print date and responsible person are found by presentation-side
/// heuristics and passed in as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    /// Data rows only, header block excluded.
    pub rows: Vec<SheetRow>,
    pub source_file: String,
    pub list_type: String,
    pub area_label: String,
    pub print_date: Option<String>,
    pub responsible: Option<Responsible>,
}

impl ImportRequest {
    pub fn new(source_file: impl Into<String>, rows: Vec<SheetRow>) -> Self {
        Self {
            rows,
            source_file: source_file.into(),
            list_type: DEFAULT_LIST_TYPE.to_string(),
            area_label: UNKNOWN_AREA.to_string(),
            print_date: None,
            responsible: None,
        }
    }

    /// Build a request from the whole sheet grid, reading the header block.
    ///
    /// An empty grid means the workbook had no readable sheet.
    pub fn from_sheet_grid(source_file: impl Into<String>, grid: Vec<SheetRow>) -> Result<Self> {
        let source_file = source_file.into();
        if grid.is_empty() {
            return Err(IngestError::malformed(source_file, "workbook has no rows"));
        }

        let cell = |(row, col): (usize, usize)| {
            grid.get(row)
                .map(|r| r.cell(col).trim())
                .filter(|value| !value.is_empty())
        };

        let list_type = layout::LIST_TYPE
            .into_iter()
            .find_map(cell)
            .unwrap_or(DEFAULT_LIST_TYPE)
            .to_string();
        let area_label = cell(layout::AREA_LABEL).unwrap_or(UNKNOWN_AREA).to_string();
        let rows = grid.into_iter().skip(layout::DATA_START_ROW).collect();

        Ok(Self {
            rows,
            source_file,
            list_type,
            area_label,
            print_date: None,
            responsible: None,
        })
    }

    #[must_use]
    pub fn with_list_type(mut self, list_type: impl Into<String>) -> Self {
        self.list_type = list_type.into();
        self
    }

    #[must_use]
    pub fn with_area_label(mut self, label: impl Into<String>) -> Self {
        self.area_label = label.into();
        self
    }

    #[must_use]
    pub fn with_print_date(mut self, date: impl Into<String>) -> Self {
        self.print_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_responsible(mut self, name: impl Into<String>, title: impl Into<String>) -> Self {
        self.responsible = Some(Responsible {
            name: name.into(),
            title: title.into(),
        });
        self
    }

    /// Area id parsed from the area label.
    pub fn area_id(&self) -> String {
        area_id_from_label(&self.area_label)
    }
}
