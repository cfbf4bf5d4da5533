//! Reading a sheet grid from a CSV export.
//!
//! Workbook parsing belongs to the host application; a CSV export of the
//! first sheet is the one format read here.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};
use crate::row::SheetRow;

/// Read every row of a CSV export, header block included.
pub fn read_sheet_rows(path: &Path) -> Result<Vec<SheetRow>> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = read_sheet_rows_from_reader(file).map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read sheet grid");
    Ok(rows)
}

/// Read rows from any reader. Rows may have differing lengths.
pub fn read_sheet_rows_from_reader<R: Read>(reader: R) -> std::result::Result<Vec<SheetRow>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row: SheetRow = record
            .iter()
            .enumerate()
            .map(|(col, value)| {
                if index == 0 && col == 0 {
                    value.trim_start_matches('\u{feff}')
                } else {
                    value
                }
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_ragged_rows() {
        let data = "\u{feff}TITULO\n12345,SILLA,,,ACME\n,\n0.5,MESA\n";
        let rows = read_sheet_rows_from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].cell(0), "TITULO");
        assert_eq!(rows[1].cell(4), "ACME");
        assert!(rows[2].is_empty());
        assert_eq!(rows[3].asset_key(), Some("0.5"));
    }

    #[test]
    fn test_read_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "12345,\"SILLA, GIRATORIA\"").unwrap();
        file.flush().unwrap();

        let rows = read_sheet_rows(file.path()).unwrap();
        assert_eq!(rows[0].cell(1), "SILLA, GIRATORIA");
    }

    #[test]
    fn test_missing_file() {
        let result = read_sheet_rows(Path::new("/nonexistent/list.csv"));
        assert!(matches!(result, Err(IngestError::FileRead { .. })));
    }
}
