//! Serializes scored locations as JSON, CSV or an annotated workbook.

mod style;
mod workbook;

pub use style::ScoreBand;
pub use workbook::export_workbook;

pub(crate) use style::{
    column, finish_table, header_format, row, write_cell, write_headers, ColumnWidths,
};

use crate::scoring::{rank, ScoredLocation, SchemaRegistry};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => crate::tabular::XLSX_CONTENT_TYPE,
        }
    }

    /// Pick the output format from a file path's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = path.rsplit_once('.')?.1;
        extension.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unbekanntes Ausgabeformat: {0}")]
    UnknownFormat(String),
    #[error("Excel-Ausgabe ist nur für Excel-Uploads verfügbar")]
    WorkbookRequired,
    #[error("keine Ergebnisse zum Schreiben")]
    NothingToWrite,
    #[error("JSON-Ausgabe fehlgeschlagen: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV-Ausgabe fehlgeschlagen: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV-Ausgabe fehlgeschlagen: {0}")]
    Io(#[from] std::io::Error),
    #[error("Excel-Ausgabe fehlgeschlagen: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

/// Copy of `results` sorted by score, highest first, ties in input order.
pub fn ranked(results: &[ScoredLocation]) -> Vec<ScoredLocation> {
    let mut ranked = results.to_vec();
    rank(&mut ranked);
    ranked
}

/// Serialize ranked results as JSON or CSV.
pub fn export_results(
    results: &[ScoredLocation],
    format: ExportFormat,
    registry: &SchemaRegistry,
) -> Result<Vec<u8>, ExportError> {
    let ranked = ranked(results);
    match format {
        ExportFormat::Json => Ok(serde_json::to_vec(&ranked)?),
        ExportFormat::Csv => export_csv(&ranked, registry),
        ExportFormat::Xlsx => Err(ExportError::WorkbookRequired),
    }
}

const BASE_COLUMNS: [&str; 4] = ["location_id", "location_name", "product", "score"];

fn export_csv(ranked: &[ScoredLocation], registry: &SchemaRegistry) -> Result<Vec<u8>, ExportError> {
    let factor_columns: Vec<&str> = registry
        .all_factor_keys()
        .into_iter()
        .filter(|key| ranked.iter().any(|result| result.factors_used.contains_key(*key)))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(BASE_COLUMNS.iter().chain(factor_columns.iter()))?;

    for result in ranked {
        let mut record = vec![
            result.location_id.to_string(),
            result.location_name.clone(),
            result.product.to_string(),
            result.score.to_string(),
        ];
        record.extend(factor_columns.iter().map(|key| {
            result
                .factors_used
                .get(*key)
                .map(|value| value.to_cell_text())
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|error| ExportError::Io(error.into_error()))
}

/// Download name for an annotated upload, e.g. `standorte_scored_20240101_120000.xlsx`.
pub fn download_filename(upload_name: &str, format: ExportFormat, now: NaiveDateTime) -> String {
    let base = upload_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = base.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(base);

    let mut sanitized: String = stem
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        sanitized = "standorte".to_string();
    }

    format!(
        "{sanitized}_scored_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
