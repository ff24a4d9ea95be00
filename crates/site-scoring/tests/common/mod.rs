#![allow(dead_code)]

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

/// Five rows: PV (53.7), charging at every maximum (100), a row without
/// product, a PV row with two factors and storage at every midpoint (50).
pub const SAMPLE_CSV: &str = "\
location_id,location_name,product,roof_area_sqm,solar_irradiation,roof_orientation_degrees,roof_tilt_degrees,electricity_price_eur,parking_spaces,daily_traffic_volume,avg_parking_duration_min,grid_connection_kw,ev_density_percent,existing_pv_kwp,annual_consumption_kwh,peak_load_kw
1,Dach Nord,pv,250,1100,180,32,0.35,,,,,,,,
2,Parkhaus Mitte,charging,,,,,,500,10000,480,1000,30,,,
3,Ohne Produkt,,250,1100,180,32,0.35,,,,,,,,
4,Zwei Faktoren,pv,250,1100,,,,,,,,,,,
5,\"Halle 7, Süd\",storage,,,,,0.35,,,,255,,250,250500,255
";

pub const BOUNDARY: &str = "site-scoring-test-boundary";

/// Workbook with an instruction sheet, a PV sheet, a storage sheet named in
/// German without a product column and an unrelated notes sheet.
pub fn sample_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let info = workbook.add_worksheet();
    info.set_name("Info").expect("sheet name");
    info.write_string(0, 0, "Information").expect("write");
    info.write_string(1, 0, "location_id product roof_area_sqm").expect("write");

    let pv = workbook.add_worksheet();
    pv.set_name("PV").expect("sheet name");
    let headers = [
        "location_id",
        "location_name",
        "product",
        "roof_area_sqm",
        "solar_irradiation",
        "roof_orientation_degrees",
        "roof_tilt_degrees",
        "electricity_price_eur",
        "address",
    ];
    for (col, header) in headers.iter().enumerate() {
        pv.write_string(0, col as u16, *header).expect("header");
    }
    let rows: [(f64, &str, &str, [f64; 5], &str); 3] = [
        (1.0, "Dach Nord", "pv", [250.0, 1100.0, 180.0, 32.0, 0.35], "Hauptstraße 1"),
        (2.0, "Dach Süd", "", [5000.0, 1300.0, 180.0, 30.0, 0.50], "Ringstraße 9"),
        (3.0, "Falsches Produkt", "charging", [250.0, 1100.0, 180.0, 32.0, 0.35], ""),
    ];
    for (index, (id, name, product, values, address)) in rows.iter().enumerate() {
        let row = index as u32 + 1;
        pv.write_number(row, 0, *id).expect("id");
        pv.write_string(row, 1, *name).expect("name");
        if !product.is_empty() {
            pv.write_string(row, 2, *product).expect("product");
        }
        for (offset, value) in values.iter().enumerate() {
            pv.write_number(row, 3 + offset as u16, *value).expect("factor");
        }
        if !address.is_empty() {
            pv.write_string(row, 8, *address).expect("address");
        }
    }

    let storage = workbook.add_worksheet();
    storage.set_name("Speicher").expect("sheet name");
    let headers = [
        "location_id",
        "location_name",
        "score",
        "existing_pv_kwp",
        "annual_consumption_kwh",
        "peak_load_kw",
        "grid_connection_kw",
        "electricity_price_eur",
    ];
    for (col, header) in headers.iter().enumerate() {
        storage.write_string(0, col as u16, *header).expect("header");
    }
    storage.write_number(1, 0, 10.0).expect("id");
    storage.write_string(1, 1, "Halle 10").expect("name");
    storage.write_number(1, 2, 1.0).expect("stale score");
    for (offset, value) in [250.0, 250_500.0, 255.0, 255.0, 0.35].iter().enumerate() {
        storage.write_number(1, 3 + offset as u16, *value).expect("factor");
    }

    let notes = workbook.add_worksheet();
    notes.set_name("Notizen").expect("sheet name");
    notes.write_string(0, 0, "roof_area_sqm").expect("write");
    notes.write_number(1, 0, 250.0).expect("write");

    workbook.save_to_buffer().expect("workbook serializes")
}

/// Sheet names and cell grids of an xlsx buffer.
pub fn read_workbook(bytes: Vec<u8>) -> Vec<(String, Vec<Vec<Data>>)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).expect("valid workbook");
    workbook
        .sheet_names()
        .into_iter()
        .map(|name| {
            let range = workbook.worksheet_range(&name).expect("sheet readable");
            let rows = range.rows().map(|row| row.to_vec()).collect();
            (name, rows)
        })
        .collect()
}

pub fn number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        _ => None,
    }
}

pub fn text(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// A multipart/form-data body carrying one file under `field`.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
