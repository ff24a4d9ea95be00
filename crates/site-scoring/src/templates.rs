//! Downloadable input templates and randomly filled mock workbooks.

use crate::export::{
    column, finish_table, header_format, row, write_cell, write_headers, ColumnWidths, ExportError,
};
use crate::scoring::{Product, SchemaRegistry, INDUSTRIES};
use crate::tabular::CellValue;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_xlsxwriter::{Format, Workbook};

pub const CSV_TEMPLATE_FILENAME: &str = "standort_template.csv";
pub const EXCEL_TEMPLATE_FILENAME: &str = "Standort_Scoring_Template.xlsx";
pub const MOCK_FILENAME: &str = "mock_locations.xlsx";

/// Rows per product sheet in a mock workbook.
pub const MOCK_ROWS: usize = 20;

#[derive(Debug, Clone, Copy)]
enum Sample {
    Number(f64),
    Text(&'static str),
}

impl Sample {
    fn cell(&self) -> CellValue {
        match self {
            Sample::Number(value) => CellValue::Number(*value),
            Sample::Text(text) => CellValue::Text((*text).to_string()),
        }
    }
}

struct ExampleSite {
    location_id: i64,
    location_name: &'static str,
    address: &'static str,
    region: &'static str,
    values: &'static [(&'static str, Sample)],
}

impl ExampleSite {
    fn value(&self, key: &str) -> Option<Sample> {
        self.values
            .iter()
            .chain(COMPANY_SAMPLE.iter())
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, sample)| *sample)
    }
}

const COMPANY_SAMPLE: &[(&str, Sample)] = &[
    ("eigentuemer", Sample::Text("Ja")),
    ("umsatz", Sample::Number(2500.0)),
    ("mitarbeiterzahl", Sample::Number(250.0)),
    ("branche", Sample::Text("Büro & Verwaltung")),
];

const PV_SITES: &[ExampleSite] = &[
    ExampleSite {
        location_id: 1,
        location_name: "Bürogebäude München Zentrum",
        address: "Maximilianstraße 1, 80539 München",
        region: "Bayern",
        values: &[
            ("roof_area_sqm", Sample::Number(450.0)),
            ("solar_irradiation", Sample::Number(1150.0)),
            ("roof_orientation_degrees", Sample::Number(180.0)),
            ("roof_tilt_degrees", Sample::Number(32.0)),
            ("electricity_price_eur", Sample::Number(0.38)),
        ],
    },
    ExampleSite {
        location_id: 2,
        location_name: "Lagerhalle Berlin Nord",
        address: "Industriestraße 42, 13189 Berlin",
        region: "Berlin",
        values: &[
            ("roof_area_sqm", Sample::Number(2500.0)),
            ("solar_irradiation", Sample::Number(980.0)),
            ("roof_orientation_degrees", Sample::Number(170.0)),
            ("roof_tilt_degrees", Sample::Number(25.0)),
            ("electricity_price_eur", Sample::Number(0.35)),
        ],
    },
    ExampleSite {
        location_id: 3,
        location_name: "Wohnkomplex Hamburg Elbchaussee",
        address: "Elbchaussee 123, 22765 Hamburg",
        region: "Hamburg",
        values: &[
            ("roof_area_sqm", Sample::Number(180.0)),
            ("solar_irradiation", Sample::Number(920.0)),
            ("roof_orientation_degrees", Sample::Number(190.0)),
            ("roof_tilt_degrees", Sample::Number(40.0)),
            ("electricity_price_eur", Sample::Number(0.42)),
        ],
    },
];

const STORAGE_SITES: &[ExampleSite] = &[
    ExampleSite {
        location_id: 10,
        location_name: "Krankenhaus Frankfurt Uniklinik",
        address: "Universitätsstraße 1, 60323 Frankfurt",
        region: "Hessen",
        values: &[
            ("existing_pv_kwp", Sample::Number(200.0)),
            ("annual_consumption_kwh", Sample::Number(450_000.0)),
            ("peak_load_kw", Sample::Number(350.0)),
            ("grid_connection_kw", Sample::Number(400.0)),
            ("electricity_price_eur", Sample::Number(0.35)),
        ],
    },
    ExampleSite {
        location_id: 11,
        location_name: "Rechenzentrum Köln Mediapark",
        address: "Mediapark 5, 50670 Köln",
        region: "Nordrhein-Westfalen",
        values: &[
            ("existing_pv_kwp", Sample::Number(150.0)),
            ("annual_consumption_kwh", Sample::Number(380_000.0)),
            ("peak_load_kw", Sample::Number(320.0)),
            ("grid_connection_kw", Sample::Number(350.0)),
            ("electricity_price_eur", Sample::Number(0.32)),
        ],
    },
    ExampleSite {
        location_id: 12,
        location_name: "Produktionshalle Stuttgart",
        address: "Mercedesstraße 88, 70372 Stuttgart",
        region: "Baden-Württemberg",
        values: &[
            ("existing_pv_kwp", Sample::Number(100.0)),
            ("annual_consumption_kwh", Sample::Number(280_000.0)),
            ("peak_load_kw", Sample::Number(250.0)),
            ("grid_connection_kw", Sample::Number(300.0)),
            ("electricity_price_eur", Sample::Number(0.33)),
        ],
    },
];

const CHARGING_SITES: &[ExampleSite] = &[
    ExampleSite {
        location_id: 20,
        location_name: "Einkaufszentrum Köln Neumarkt",
        address: "Neumarkt 1, 50667 Köln",
        region: "Nordrhein-Westfalen",
        values: &[
            ("parking_spaces", Sample::Number(80.0)),
            ("daily_traffic_volume", Sample::Number(3500.0)),
            ("avg_parking_duration_min", Sample::Number(180.0)),
            ("grid_connection_kw", Sample::Number(150.0)),
            ("ev_density_percent", Sample::Number(15.0)),
        ],
    },
    ExampleSite {
        location_id: 21,
        location_name: "Autobahnraststätte A9 Nord",
        address: "A9 Raststätte Fürholzen Nord",
        region: "Bayern",
        values: &[
            ("parking_spaces", Sample::Number(150.0)),
            ("daily_traffic_volume", Sample::Number(8000.0)),
            ("avg_parking_duration_min", Sample::Number(45.0)),
            ("grid_connection_kw", Sample::Number(350.0)),
            ("ev_density_percent", Sample::Number(8.0)),
        ],
    },
    ExampleSite {
        location_id: 22,
        location_name: "Parkhaus München Stadtzentrum",
        address: "Karlsplatz 5, 80335 München",
        region: "Bayern",
        values: &[
            ("parking_spaces", Sample::Number(200.0)),
            ("daily_traffic_volume", Sample::Number(2500.0)),
            ("avg_parking_duration_min", Sample::Number(240.0)),
            ("grid_connection_kw", Sample::Number(200.0)),
            ("ev_density_percent", Sample::Number(18.0)),
        ],
    },
    ExampleSite {
        location_id: 23,
        location_name: "Firmenparkplatz Walldorf",
        address: "Industriestraße 1, 69190 Walldorf",
        region: "Baden-Württemberg",
        values: &[
            ("parking_spaces", Sample::Number(300.0)),
            ("daily_traffic_volume", Sample::Number(1200.0)),
            ("avg_parking_duration_min", Sample::Number(480.0)),
            ("grid_connection_kw", Sample::Number(250.0)),
            ("ev_density_percent", Sample::Number(22.0)),
        ],
    },
];

const INFO_LINES: &[&str] = &[
    "Standort-Scoring Tool - Excel Template",
    "",
    "Diese Datei enthält drei Sheets:",
    "1. PV - Photovoltaik-Standorte",
    "2. Storage - Energiespeicher-Standorte",
    "3. Charging - Ladeinfrastruktur-Standorte",
    "",
    "Anleitung:",
    "1. Ersetzen Sie die Beispieldaten mit Ihren Standortdaten",
    "2. Pro Zeile mindestens drei Faktoren ausfüllen",
    "3. Die 'product' Spalte muss 'pv', 'storage' oder 'charging' sein",
    "4. Datei hochladen und Ergebnisse herunterladen",
    "5. Ergebnisse werden nach Score sortiert angezeigt",
    "",
    "Wichtig:",
    "- Spaltennamen dürfen NICHT geändert werden",
    "- Werte außerhalb des Bereichs werden auf die Grenzen begrenzt",
    "- Sheets können auch einzeln verwendet werden",
    "- Zusätzliche Spalten wie address oder region bleiben erhalten",
];

fn example_sites(product: Product) -> &'static [ExampleSite] {
    match product {
        Product::Pv => PV_SITES,
        Product::Storage => STORAGE_SITES,
        Product::Charging => CHARGING_SITES,
    }
}

/// Header plus one example row per product covering every factor of the registry.
pub fn csv_template(registry: &SchemaRegistry) -> Result<Vec<u8>, ExportError> {
    let factor_keys = registry.all_factor_keys();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["location_id", "location_name", "product"];
    header.extend(factor_keys.iter().copied());
    writer.write_record(&header)?;

    for product in Product::ALL {
        let schema = registry.schema(product);
        let Some(site) = example_sites(product).first() else {
            continue;
        };

        let mut record = vec![
            site.location_id.to_string(),
            site.location_name.to_string(),
            product.key().to_string(),
        ];
        record.extend(factor_keys.iter().map(|key| {
            schema
                .factor(key)
                .and_then(|_| site.value(key))
                .map(|sample| sample.cell().to_text())
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|error| ExportError::Io(error.into_error()))
}

/// Example workbook with one sheet per product and an instruction sheet.
pub fn excel_template(registry: &SchemaRegistry) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = header_format();

    for product in Product::ALL {
        let schema = registry.schema(product);
        let mut headers: Vec<String> = ["location_id", "location_name", "product"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        headers.extend(schema.keys().map(str::to_string));
        headers.push("address".to_string());
        headers.push("region".to_string());

        let rows: Vec<Vec<CellValue>> = example_sites(product)
            .iter()
            .map(|site| {
                let mut cells = vec![
                    CellValue::Number(site.location_id as f64),
                    CellValue::Text(site.location_name.to_string()),
                    CellValue::Text(product.key().to_string()),
                ];
                cells.extend(schema.keys().map(|key| {
                    site.value(key)
                        .map(|sample| sample.cell())
                        .unwrap_or(CellValue::Empty)
                }));
                cells.push(CellValue::Text(site.address.to_string()));
                cells.push(CellValue::Text(site.region.to_string()));
                cells
            })
            .collect();

        write_sheet(&mut workbook, product.sheet_title(), &headers, &rows, &header_format)?;
    }

    let info = workbook.add_worksheet();
    info.set_name("Info")?;
    info.write_string_with_format(0, 0, "Information", &header_format)?;
    for (index, line) in INFO_LINES.iter().enumerate() {
        info.write_string(row(index + 1)?, 0, *line)?;
    }
    info.set_column_width(0, 60)?;

    Ok(workbook.save_to_buffer()?)
}

const MOCK_ADDRESSES: &[&str] = &[
    "Münchner Straße 15, 80331 München",
    "Hauptstraße 42, 10115 Berlin",
    "Königsallee 1, 40212 Düsseldorf",
    "Neuer Wall 10, 20354 Hamburg",
    "Zeil 5, 60313 Frankfurt am Main",
    "Königstraße 30, 70173 Stuttgart",
    "Breite Straße 8, 50667 Köln",
    "Marktplatz 2, 04109 Leipzig",
    "Bahnhofstraße 20, 01099 Dresden",
    "Lange Straße 1, 30159 Hannover",
];

const MOCK_PV_NAMES: &[&str] = &[
    "Gewerbegebiet Nord - Lagerhalle A",
    "Industriezentrum Süd - Produktionshalle",
    "Einkaufszentrum City - Dachfläche",
    "Bürokomplex Mitte - Hauptgebäude",
    "Logistikzentrum West - Halle 3",
    "Produktionsstätte Ost - Werk 1",
];

const MOCK_STORAGE_NAMES: &[&str] = &[
    "Bürokomplex Hauptstraße - Hauptgebäude",
    "Produktionsstätte Industriegebiet - Werk 2",
    "Verwaltungszentrum - Gebäude A",
    "Gewerbegebiet - Halle 1",
    "Logistikzentrum - Verwaltungsgebäude",
    "Industriepark - Verwaltungsgebäude",
];

const MOCK_CHARGING_NAMES: &[&str] = &[
    "Parkhaus Innenstadt - Ebene 1",
    "Einkaufszentrum - Parkplatz Nord",
    "Bahnhof - Parkplatz P1",
    "Krankenhaus - Parkplatz Haupteingang",
    "Supermarkt - Kundenparkplatz",
    "Universität - Parkplatz Campus",
];

const MOCK_ORIENTATIONS: [f64; 7] = [150.0, 160.0, 170.0, 180.0, 190.0, 200.0, 210.0];

fn pick<R: Rng>(rng: &mut R, values: &[&'static str]) -> CellValue {
    CellValue::Text(values.choose(rng).copied().unwrap_or_default().to_string())
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mock_factors<R: Rng>(rng: &mut R, product: Product) -> Vec<(&'static str, CellValue)> {
    let number = CellValue::Number;
    match product {
        Product::Pv => vec![
            ("roof_area_sqm", number(rng.gen_range(100..=2000) as f64)),
            ("solar_irradiation", number(rng.gen_range(900..=1250) as f64)),
            (
                "roof_orientation_degrees",
                number(MOCK_ORIENTATIONS.choose(rng).copied().unwrap_or(180.0)),
            ),
            ("roof_tilt_degrees", number(rng.gen_range(20..=45) as f64)),
            ("electricity_price_eur", number(cents(rng.gen_range(0.25..=0.45)))),
        ],
        Product::Storage => vec![
            ("existing_pv_kwp", number(rng.gen_range(50..=300) as f64)),
            (
                "annual_consumption_kwh",
                number(rng.gen_range(50_000..=400_000) as f64),
            ),
            ("peak_load_kw", number(rng.gen_range(50..=300) as f64)),
            ("grid_connection_kw", number(rng.gen_range(50..=400) as f64)),
            ("electricity_price_eur", number(cents(rng.gen_range(0.25..=0.45)))),
        ],
        Product::Charging => vec![
            ("parking_spaces", number(rng.gen_range(20..=300) as f64)),
            ("daily_traffic_volume", number(rng.gen_range(200..=5000) as f64)),
            ("avg_parking_duration_min", number(rng.gen_range(30..=240) as f64)),
            ("grid_connection_kw", number(rng.gen_range(50..=500) as f64)),
            (
                "ev_density_percent",
                number((rng.gen_range(2.0..=20.0_f64) * 10.0).round() / 10.0),
            ),
        ],
    }
}

/// Workbook with [`MOCK_ROWS`] random locations per product, company columns included.
/// The same seed always yields the same data.
pub fn mock_workbook(seed: Option<u64>) -> Result<Vec<u8>, ExportError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut workbook = Workbook::new();
    let header_format = header_format();

    for product in Product::ALL {
        let names = match product {
            Product::Pv => MOCK_PV_NAMES,
            Product::Storage => MOCK_STORAGE_NAMES,
            Product::Charging => MOCK_CHARGING_NAMES,
        };

        let mut headers: Vec<String> = [
            "location_id",
            "location_name",
            "address",
            "product",
            "eigentuemer",
            "umsatz",
            "mitarbeiterzahl",
            "branche",
        ]
        .iter()
        .map(|name| name.to_string())
        .collect();
        let mut rows = Vec::with_capacity(MOCK_ROWS);

        for id in 1..=MOCK_ROWS {
            let mut cells = vec![
                CellValue::Number(id as f64),
                pick(&mut rng, names),
                pick(&mut rng, MOCK_ADDRESSES),
                CellValue::Text(product.key().to_string()),
                pick(&mut rng, &["Ja", "Nein"]),
                CellValue::Number((rng.gen_range(1..=1000) * 10) as f64),
                CellValue::Number(rng.gen_range(1..=10_000) as f64),
                pick(&mut rng, INDUSTRIES),
            ];
            let factors = mock_factors(&mut rng, product);
            if id == 1 {
                headers.extend(factors.iter().map(|(key, _)| key.to_string()));
            }
            cells.extend(factors.into_iter().map(|(_, cell)| cell));
            rows.push(cells);
        }

        write_sheet(&mut workbook, product.sheet_title(), &headers, &rows, &header_format)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    headers: &[String],
    rows: &[Vec<CellValue>],
    header_format: &Format,
) -> Result<(), ExportError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name)?;
    write_headers(worksheet, headers, header_format)?;

    let mut widths = ColumnWidths::default();
    for (col, header) in headers.iter().enumerate() {
        widths.observe(col, header.chars().count());
    }
    for (index, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            write_cell(worksheet, row(index + 1)?, column(col)?, cell)?;
            widths.observe(col, cell.display_len());
        }
    }

    finish_table(worksheet, &widths, rows.len())?;
    Ok(())
}
