use super::style::{self, ColumnWidths};
use super::ExportError;
use crate::scoring::{format_number, ScoredLocation};
use crate::tabular::{
    normalize_header, CellValue, HeaderIndex, ParsedTable, SheetTable, LOCATION_ID, LOCATION_NAME,
};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;

const SCORE_HEADER: &str = "Score";

/// Copy every input sheet that produced results, with a coloured score column.
pub fn export_workbook(
    parsed: &ParsedTable,
    results: &[ScoredLocation],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = style::header_format();
    let mut written = 0;

    for sheet in &parsed.sheets {
        let scores = SheetScores::collect(&sheet.name, results);
        if scores.is_empty() {
            continue;
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        let (headers, score_col) = headers_with_score(sheet);
        style::write_headers(worksheet, &headers, &header_format)?;

        let mut widths = ColumnWidths::default();
        for (col, header) in headers.iter().enumerate() {
            widths.observe(col, header.chars().count());
        }

        let index = HeaderIndex::new(&sheet.headers);
        for (row_index, row) in sheet.rows.iter().enumerate() {
            let target = style::row(row_index + 1)?;
            for (col, cell) in row.iter().enumerate() {
                if col == score_col {
                    continue;
                }
                style::write_cell(worksheet, target, style::column(col)?, cell)?;
                widths.observe(col, cell.display_len());
            }

            if let Some(score) = scores.lookup(&index, row, row_index) {
                worksheet.write_number_with_format(
                    target,
                    style::column(score_col)?,
                    score,
                    &style::score_format(score),
                )?;
                widths.observe(score_col, format_number(score).chars().count());
            }
        }

        style::finish_table(worksheet, &widths, sheet.rows.len())?;
        written += 1;
    }

    if written == 0 {
        return Err(ExportError::NothingToWrite);
    }

    Ok(workbook.save_to_buffer()?)
}

/// Input headers with the score column appended, or reused when present.
fn headers_with_score(sheet: &SheetTable) -> (Vec<String>, usize) {
    let mut headers = sheet.headers.clone();
    let existing = headers
        .iter()
        .position(|header| normalize_header(header) == "score");

    match existing {
        Some(position) => {
            headers[position] = SCORE_HEADER.to_string();
            (headers, position)
        }
        None => {
            headers.push(SCORE_HEADER.to_string());
            let position = headers.len() - 1;
            (headers, position)
        }
    }
}

/// Scores of one sheet keyed by origin row, with location identity as fallback.
struct SheetScores {
    by_identity: HashMap<(i64, String), f64>,
    by_row: HashMap<usize, f64>,
}

impl SheetScores {
    fn collect(sheet: &str, results: &[ScoredLocation]) -> Self {
        let mut by_identity = HashMap::new();
        let mut by_row = HashMap::new();

        for result in results {
            let Some(origin) = result.origin.as_ref().filter(|origin| origin.sheet == sheet)
            else {
                continue;
            };
            by_identity
                .entry((result.location_id, result.location_name.trim().to_string()))
                .or_insert(result.score);
            by_row.entry(origin.row_index).or_insert(result.score);
        }

        Self {
            by_identity,
            by_row,
        }
    }

    fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }

    fn lookup(&self, index: &HeaderIndex, row: &[CellValue], row_index: usize) -> Option<f64> {
        let location_id = index
            .cell(row, LOCATION_ID)
            .and_then(CellValue::as_integer)
            .unwrap_or_default();
        let location_name = index
            .cell(row, LOCATION_NAME)
            .map(CellValue::to_text)
            .unwrap_or_default();

        self.by_row
            .get(&row_index)
            .or_else(|| self.by_identity.get(&(location_id, location_name)))
            .copied()
    }
}
