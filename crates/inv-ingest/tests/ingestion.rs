//! End-to-end ingestion of sheet rows.

use inv_ingest::{ImportRequest, SheetRow, ingest_rows, ingest_rows_with_progress};
use inv_model::LocatedStatus;

fn rows(keys: &[&str]) -> Vec<SheetRow> {
    keys.iter()
        .map(|key| [*key, "DESCRIPCION"].into_iter().collect())
        .collect()
}

#[tokio::test]
async fn three_row_sheet_keeps_valid_keys() {
    let request = ImportRequest::new("area7.xlsx", rows(&["12345", "abc", "0.5"]))
        .with_area_label("AREA 7 ADMINISTRACION");

    let sheet = ingest_rows(&request, 1_700_000_000_000, 500).await;

    let keys: Vec<&str> = sheet.assets.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys, ["12345", "0.5"]);
    assert!(
        sheet
            .assets
            .iter()
            .all(|a| a.status == LocatedStatus::NotLocated && !a.reprint_label)
    );
    assert!(sheet.assets.iter().all(|a| a.list_id == 1_700_000_000_000));
    assert!(sheet.assets.iter().all(|a| a.origin_area == "7"));

    assert_eq!(sheet.summary.imported, 2);
    assert_eq!(sheet.summary.skipped_rows(), 1);
    assert_eq!(sheet.summary.skipped[0].index, 1);
    assert_eq!(sheet.summary.skipped[0].key_cell, "abc");
}

#[tokio::test]
async fn keys_are_trimmed_and_blank_rows_ignored() {
    let mut data = rows(&[" 54321 ", "1234567"]);
    data.push(SheetRow::default());
    let request = ImportRequest::new("x.xlsx", data);

    let sheet = ingest_rows(&request, 1, 500).await;
    assert_eq!(sheet.assets[0].key, "54321");
    assert_eq!(sheet.summary.skipped_rows(), 1);
    assert_eq!(sheet.summary.total_rows, 3);
    assert_eq!(sheet.summary.area, "Sin Área");
}

#[tokio::test]
async fn progress_is_reported_per_chunk() {
    let keys: Vec<String> = (10_000..10_012).map(|k| k.to_string()).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let request = ImportRequest::new("big.xlsx", rows(&key_refs));

    let mut seen = Vec::new();
    let sheet = ingest_rows_with_progress(&request, 1, 5, |p| seen.push(p.processed)).await;

    assert_eq!(seen, [5, 10, 12]);
    assert_eq!(sheet.assets.len(), 12);
    assert_eq!(sheet.assets[11].key, "10011");
}
