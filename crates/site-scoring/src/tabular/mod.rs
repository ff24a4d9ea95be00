//! Turns uploaded CSV files and spreadsheet workbooks into location drafts.
//!
//! Individual rows and cells never fail an upload: unreadable records, rows
//! without a usable product and rows with too few recognized factors are
//! dropped and logged. Only an empty, unreadable or entirely unusable file is
//! an error.

mod cell;
mod delimited;
mod rows;
mod workbook;

pub use cell::CellValue;
pub use delimited::DELIMITED_SHEET;

pub(crate) use rows::{normalize_header, HeaderIndex, LOCATION_ID, LOCATION_NAME};

use crate::scoring::{LocationDraft, Product, SchemaRegistry};
use rows::RowContext;
use tracing::{debug, info};

/// Default number of recognized factors a row needs to be scored.
pub const DEFAULT_MIN_FACTORS: usize = 3;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Workbook,
}

impl TableFormat {
    /// Detect the upload format from its file name.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let guess = mime_guess::from_path(filename.trim().to_lowercase()).first()?;
        if guess.type_() == mime::TEXT && guess.subtype() == mime::CSV {
            return Some(TableFormat::Delimited);
        }

        let essence = guess.essence_str().to_ascii_lowercase();
        let spreadsheet = [
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml",
            "application/vnd.oasis.opendocument.spreadsheet",
        ];
        spreadsheet
            .iter()
            .any(|prefix| essence.starts_with(prefix))
            .then_some(TableFormat::Workbook)
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            TableFormat::Delimited => "text/csv; charset=utf-8",
            TableFormat::Workbook => XLSX_CONTENT_TYPE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub min_factors: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            min_factors: DEFAULT_MIN_FACTORS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Die Datei ist leer")]
    Empty,
    #[error("Ungültiges Dateiformat. Bitte CSV oder Excel (.xlsx, .xls) hochladen.")]
    UnsupportedFormat(String),
    #[error("Keine gültigen Daten gefunden. Bitte überprüfen Sie das Dateiformat.")]
    TooFewLines,
    #[error("Keine gültigen Standorte gefunden")]
    NoUsableRows,
    #[error("Die CSV-Datei konnte nicht gelesen werden: {0}")]
    Csv(#[from] csv::Error),
    #[error("Die Excel-Datei konnte nicht gelesen werden: {0}")]
    Workbook(#[from] calamine::Error),
}

/// One table of an upload with its original header and cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    /// Product implied by the sheet name, if any.
    pub product: Option<Product>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_seen: usize,
    pub accepted: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub format: TableFormat,
    pub sheets: Vec<SheetTable>,
    pub stats: IngestStats,
    drafts: Vec<LocationDraft>,
}

impl ParsedTable {
    pub fn drafts(&self) -> &[LocationDraft] {
        &self.drafts
    }
}

/// Parse an upload, picking the reader from `filename`.
pub fn parse_table(
    bytes: &[u8],
    filename: &str,
    registry: &SchemaRegistry,
    options: IngestOptions,
) -> Result<ParsedTable, IngestError> {
    let format = TableFormat::from_filename(filename)
        .ok_or_else(|| IngestError::UnsupportedFormat(filename.to_string()))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::Empty);
    }

    let sheets = match format {
        TableFormat::Delimited => vec![delimited::read_delimited(bytes)?],
        TableFormat::Workbook => workbook::read_workbook(bytes)?,
    };

    if sheets
        .iter()
        .all(|sheet| sheet.headers.is_empty() || sheet.rows.is_empty())
    {
        return Err(IngestError::TooFewLines);
    }

    let mut stats = IngestStats::default();
    let mut drafts = Vec::new();

    for sheet in &sheets {
        let index = HeaderIndex::new(&sheet.headers);
        let context = RowContext {
            index: &index,
            sheet: &sheet.name,
            sheet_product: sheet.product,
            registry,
            min_factors: options.min_factors,
        };

        for (row_index, row) in sheet.rows.iter().enumerate() {
            stats.rows_seen += 1;
            match context.extract(row, row_index) {
                Ok(draft) => {
                    stats.accepted += 1;
                    drafts.push(draft);
                }
                Err(skip) => {
                    stats.dropped += 1;
                    debug!(sheet = %sheet.name, row = row_index, reason = %skip.reason(), "dropping row");
                }
            }
        }
    }

    info!(
        file = filename,
        sheets = sheets.len(),
        rows = stats.rows_seen,
        accepted = stats.accepted,
        dropped = stats.dropped,
        "parsed upload"
    );

    if drafts.is_empty() {
        return Err(IngestError::NoUsableRows);
    }

    Ok(ParsedTable {
        format,
        sheets,
        stats,
        drafts,
    })
}
