//! Chunked conversion of sheet rows into asset records.

use inv_model::Asset;
use serde::Serialize;

use crate::row::{SheetRow, column};
use crate::sheet::ImportRequest;

/// Rows converted between two yields to the runtime.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// A non-blank row whose key cell is not a valid asset key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Zero-based position among the request's data rows.
    pub index: usize,
    pub key_cell: String,
}

/// Outcome of one spreadsheet import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub source_file: String,
    pub area: String,
    pub list_id: i64,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    /// Assets of an earlier import of the same file that were replaced.
    pub replaced: usize,
}

impl ImportSummary {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }
}

/// Progress reported after each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportProgress {
    pub processed: usize,
    pub total: usize,
}

impl ImportProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        u8::try_from(self.processed.min(self.total) * 100 / self.total).unwrap_or(100)
    }
}

/// Assets built from a request, not yet merged into any session.
#[derive(Debug, Clone)]
pub struct IngestedSheet {
    pub assets: Vec<Asset>,
    pub summary: ImportSummary,
}

/// Build a not-located asset from a validated row.
pub fn asset_from_row(
    row: &SheetRow,
    key: &str,
    request: &ImportRequest,
    area: &str,
    list_id: i64,
) -> Asset {
    let mut asset = Asset::new(key);
    asset.description = row.cell(column::DESCRIPTION).to_string();
    asset.office = row.cell(column::OFFICE).to_string();
    asset.asset_type = row.cell(column::TYPE).to_string();
    asset.brand = row.cell(column::BRAND).to_string();
    asset.model = row.cell(column::MODEL).to_string();
    asset.serial = row.cell(column::SERIAL).to_string();
    asset.list_type.clone_from(&request.list_type);
    asset.origin_area = area.to_string();
    asset.list_id = list_id;
    asset.source_file.clone_from(&request.source_file);
    asset.print_date.clone_from(&request.print_date);
    asset
}

/// Convert every valid row of `request`, yielding between chunks.
pub async fn ingest_rows(request: &ImportRequest, list_id: i64, chunk_size: usize) -> IngestedSheet {
    ingest_rows_with_progress(request, list_id, chunk_size, |_| {}).await
}

/// Like [`ingest_rows`], calling `on_progress` after every chunk.
pub async fn ingest_rows_with_progress<F>(
    request: &ImportRequest,
    list_id: i64,
    chunk_size: usize,
    mut on_progress: F,
) -> IngestedSheet
where
    F: FnMut(ImportProgress),
{
    let chunk_size = chunk_size.max(1);
    let area = request.area_id();
    let total = request.rows.len();
    let mut assets = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (chunk_index, chunk) in request.rows.chunks(chunk_size).enumerate() {
        let offset = chunk_index * chunk_size;
        for (i, row) in chunk.iter().enumerate() {
            match row.asset_key() {
                Some(key) => assets.push(asset_from_row(row, key, request, &area, list_id)),
                None if row.is_empty() => {}
                None => skipped.push(SkippedRow {
                    index: offset + i,
                    key_cell: row.cell(column::KEY).to_string(),
                }),
            }
        }

        let processed = offset + chunk.len();
        on_progress(ImportProgress { processed, total });
        tracing::trace!(processed, total, "ingested chunk");

        if processed < total {
            tokio::task::yield_now().await;
        }
    }

    tracing::debug!(
        source_file = %request.source_file,
        area = %area,
        imported = assets.len(),
        skipped = skipped.len(),
        "ingested sheet"
    );

    let summary = ImportSummary {
        source_file: request.source_file.clone(),
        area,
        list_id,
        total_rows: total,
        imported: assets.len(),
        skipped,
        replaced: 0,
    };
    IngestedSheet { assets, summary }
}
