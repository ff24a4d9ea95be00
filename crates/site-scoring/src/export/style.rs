use crate::tabular::CellValue;
use rust_xlsxwriter::{Color, Format, FormatAlign, Worksheet, XlsxError};

const HEADER_BACKGROUND: u32 = 0x366092;
const MAX_COLUMN_WIDTH: usize = 50;

/// Score bands used to colour score cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 40.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn fill(&self) -> u32 {
        match self {
            ScoreBand::Excellent => 0xC6EFCE,
            ScoreBand::Good => 0xBDD7EE,
            ScoreBand::Fair => 0xFFEB9C,
            ScoreBand::Poor => 0xFFC7CE,
        }
    }
}

pub(crate) fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BACKGROUND))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub(crate) fn score_format(score: f64) -> Format {
    Format::new()
        .set_num_format("0.0")
        .set_background_color(Color::RGB(ScoreBand::of(score).fill()))
        .set_align(FormatAlign::Center)
}

pub(crate) fn column(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

pub(crate) fn row(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

pub(crate) fn write_headers(
    worksheet: &mut Worksheet,
    headers: &[String],
    format: &Format,
) -> Result<(), XlsxError> {
    for (index, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column(index)?, header, format)?;
    }
    Ok(())
}

pub(crate) fn write_cell(
    worksheet: &mut Worksheet,
    row_index: u32,
    col: u16,
    cell: &CellValue,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Number(value) => {
            worksheet.write_number(row_index, col, *value)?;
        }
        CellValue::Text(text) => {
            worksheet.write_string(row_index, col, text)?;
        }
        CellValue::Bool(flag) => {
            worksheet.write_boolean(row_index, col, *flag)?;
        }
    }
    Ok(())
}

/// Tracks the longest value per column for width sizing.
#[derive(Debug, Default)]
pub(crate) struct ColumnWidths {
    longest: Vec<usize>,
}

impl ColumnWidths {
    pub(crate) fn observe(&mut self, col: usize, len: usize) {
        if self.longest.len() <= col {
            self.longest.resize(col + 1, 0);
        }
        self.longest[col] = self.longest[col].max(len);
    }

    pub(crate) fn width(&self, col: usize) -> usize {
        (self.longest.get(col).copied().unwrap_or_default() + 2).min(MAX_COLUMN_WIDTH)
    }

    pub(crate) fn columns(&self) -> usize {
        self.longest.len()
    }
}

/// Column widths, frozen header row and an autofilter over the data range.
pub(crate) fn finish_table(
    worksheet: &mut Worksheet,
    widths: &ColumnWidths,
    data_rows: usize,
) -> Result<(), XlsxError> {
    for col in 0..widths.columns() {
        worksheet.set_column_width(column(col)?, widths.width(col) as f64)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    if widths.columns() > 0 {
        worksheet.autofilter(0, 0, row(data_rows)?, column(widths.columns() - 1)?)?;
    }
    Ok(())
}
