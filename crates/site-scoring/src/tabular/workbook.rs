use super::cell::CellValue;
use super::rows::{normalize_header, PRODUCT};
use super::SheetTable;
use crate::scoring::Product;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use tracing::{debug, warn};

const INSTRUCTION_SHEETS: [&str; 4] = ["info", "anleitung", "instructions", "readme"];

pub(crate) fn is_instruction_sheet(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    INSTRUCTION_SHEETS.contains(&lowered.as_str())
}

/// Read every data sheet of a workbook. Instruction sheets are skipped, as are
/// sheets that neither name a product nor carry a product column.
pub(crate) fn read_workbook(bytes: &[u8]) -> Result<Vec<SheetTable>, calamine::Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let mut tables = Vec::new();

    for name in workbook.sheet_names() {
        if is_instruction_sheet(&name) {
            debug!(sheet = %name, "skipping instruction sheet");
            continue;
        }

        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(error) => {
                warn!(sheet = %name, %error, "skipping unreadable sheet");
                continue;
            }
        };

        let table = sheet_table(&name, &range);
        let has_product_column = table
            .headers
            .iter()
            .any(|header| normalize_header(header) == PRODUCT);
        if table.product.is_none() && !has_product_column {
            debug!(sheet = %name, "skipping sheet without product");
            continue;
        }

        tables.push(table);
    }

    Ok(tables)
}

fn sheet_table(name: &str, range: &Range<Data>) -> SheetTable {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| CellValue::from(cell).to_text())
                .collect()
        })
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    SheetTable {
        name: name.to_string(),
        product: Product::from_sheet_name(name),
        headers,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_sheets_are_recognized() {
        assert!(is_instruction_sheet("Info"));
        assert!(is_instruction_sheet(" README "));
        assert!(is_instruction_sheet("Anleitung"));
        assert!(!is_instruction_sheet("Information"));
        assert!(!is_instruction_sheet("PV"));
    }

    #[test]
    fn garbage_is_not_a_workbook() {
        assert!(read_workbook(b"definitely not a spreadsheet").is_err());
    }
}
