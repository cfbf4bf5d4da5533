//! Ingestion of institutional asset lists.
//!
//! This crate turns the rows of one spreadsheet into [`Asset`] records:
//!
//! - **Row validation**: column 0 must hold an institutional key
//!   (`^(?:\d{5,6}|0\.\d+)$` after trimming); other rows are skipped and
//!   reported in the [`ImportSummary`]
//! - **Chunked conversion**: rows are converted in chunks with a yield to
//!   the runtime between chunks, so large lists never starve other tasks
//! - **Sheet layout**: the header block of the institutional format
//!   (list type, area label) is read by [`ImportRequest::from_sheet_grid`]
//!
//! Merging the result into a session is the caller's job.
//!
//! [`Asset`]: inv_model::Asset

mod error;
mod grid;
mod ingest;
mod row;
mod sheet;

// === Error Types ===
pub use error::{IngestError, Result};

// === Rows ===
pub use row::{SheetRow, column, is_valid_asset_key};

// === Requests ===
pub use sheet::{DEFAULT_LIST_TYPE, ImportRequest, Responsible, layout};

// === Ingestion ===
pub use ingest::{
    DEFAULT_CHUNK_SIZE, ImportProgress, ImportSummary, IngestedSheet, SkippedRow, asset_from_row,
    ingest_rows, ingest_rows_with_progress,
};

// === Grid Reading ===
pub use grid::{read_sheet_rows, read_sheet_rows_from_reader};
