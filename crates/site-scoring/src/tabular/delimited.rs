use super::cell::CellValue;
use super::SheetTable;
use tracing::debug;

/// Name given to the single table of a delimited upload.
pub const DELIMITED_SHEET: &str = "CSV";

/// Read comma-separated bytes into one table. Invalid UTF-8 is replaced and a
/// leading byte-order mark is dropped.
pub(crate) fn read_delimited(bytes: &[u8]) -> Result<SheetTable, csv::Error> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(record.iter().map(CellValue::from_text).collect()),
            Err(error) => debug!(line = line + 2, %error, "skipping unreadable csv record"),
        }
    }

    Ok(SheetTable {
        name: DELIMITED_SHEET.to_string(),
        product: None,
        headers,
        rows,
    })
}
