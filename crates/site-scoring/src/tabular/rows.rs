use super::cell::CellValue;
use crate::scoring::{FactorSet, LocationDraft, Product, RowOrigin, SchemaRegistry};
use std::collections::HashMap;

pub(crate) const LOCATION_ID: &str = "location_id";
pub(crate) const LOCATION_NAME: &str = "location_name";
pub(crate) const PRODUCT: &str = "product";

/// Header cell as a lookup key: invisible marks removed, whitespace collapsed, lower case.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Column positions by normalized header; the first duplicate wins.
#[derive(Debug, Default)]
pub(crate) struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            columns.entry(normalize_header(header)).or_insert(position);
        }
        Self { columns }
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.columns.get(key).copied()
    }

    pub(crate) fn cell<'a>(&self, row: &'a [CellValue], key: &str) -> Option<&'a CellValue> {
        self.position(key).and_then(|position| row.get(position))
    }
}

/// Why a row did not become a location draft.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RowSkip {
    Blank,
    MissingProduct,
    UnknownProduct(String),
    TooFewFactors(usize),
}

impl RowSkip {
    pub(crate) fn reason(&self) -> String {
        match self {
            RowSkip::Blank => "row is blank".to_string(),
            RowSkip::MissingProduct => "no product in row or sheet".to_string(),
            RowSkip::UnknownProduct(name) => format!("unknown product '{name}'"),
            RowSkip::TooFewFactors(found) => format!("only {found} recognized factors"),
        }
    }
}

pub(crate) struct RowContext<'a> {
    pub(crate) index: &'a HeaderIndex,
    pub(crate) sheet: &'a str,
    pub(crate) sheet_product: Option<Product>,
    pub(crate) registry: &'a SchemaRegistry,
    pub(crate) min_factors: usize,
}

impl RowContext<'_> {
    pub(crate) fn extract(
        &self,
        row: &[CellValue],
        row_index: usize,
    ) -> Result<LocationDraft, RowSkip> {
        if row.iter().all(CellValue::is_blank) {
            return Err(RowSkip::Blank);
        }

        let product = self.resolve_product(row)?;
        let schema = self.registry.schema(product);

        let factors: FactorSet = schema
            .factors
            .iter()
            .filter_map(|definition| {
                self.index
                    .cell(row, definition.key)
                    .and_then(|cell| cell.to_factor(definition))
                    .map(|value| (definition.key.to_string(), value))
            })
            .collect();

        if factors.len() < self.min_factors {
            return Err(RowSkip::TooFewFactors(factors.len()));
        }

        let location_id = self
            .index
            .cell(row, LOCATION_ID)
            .and_then(CellValue::as_integer)
            .unwrap_or_default();
        let location_name = self
            .index
            .cell(row, LOCATION_NAME)
            .map(CellValue::to_text)
            .unwrap_or_default();

        Ok(LocationDraft {
            location_id,
            location_name,
            product,
            factors,
            origin: Some(RowOrigin {
                sheet: self.sheet.to_string(),
                row_index,
            }),
        })
    }

    fn resolve_product(&self, row: &[CellValue]) -> Result<Product, RowSkip> {
        let cell = self
            .index
            .cell(row, PRODUCT)
            .filter(|cell| !cell.is_blank())
            .map(CellValue::to_text);

        match (cell, self.sheet_product) {
            (Some(raw), fallback) => match raw.parse::<Product>() {
                Ok(product) => Ok(product),
                Err(_) => fallback.ok_or(RowSkip::UnknownProduct(raw)),
            },
            (None, Some(product)) => Ok(product),
            (None, None) => Err(RowSkip::MissingProduct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|value| CellValue::from_text(value)).collect()
    }

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header("\u{feff} Location_ID "), "location_id");
        assert_eq!(normalize_header("Roof\u{200b}  Area"), "roof area");
    }

    #[test]
    fn first_duplicate_header_wins() {
        let index = HeaderIndex::new(&headers(&["product", "Product", "score"]));
        assert_eq!(index.position("product"), Some(0));
        assert_eq!(index.position("score"), Some(2));
        assert_eq!(index.position("location_id"), None);
    }

    #[test]
    fn row_product_overrides_sheet_product() {
        let registry = SchemaRegistry::standard();
        let index = HeaderIndex::new(&headers(&[
            "location_id",
            "location_name",
            "product",
            "parking_spaces",
            "daily_traffic_volume",
            "grid_connection_kw",
        ]));
        let context = RowContext {
            index: &index,
            sheet: "PV",
            sheet_product: Some(Product::Pv),
            registry: &registry,
            min_factors: 3,
        };

        let draft = context
            .extract(&row(&["7", " Depot ", "charging", "80", "5000", "250"]), 0)
            .expect("charging row");
        assert_eq!(draft.product, Product::Charging);
        assert_eq!(draft.location_id, 7);
        assert_eq!(draft.location_name, "Depot");
        assert_eq!(draft.factors.len(), 3);

        let fallback = context.extract(&row(&["8", "Hof", "wind", "80", "5000", "250"]), 1);
        // Falls back to PV, where none of the charging columns exist.
        assert_eq!(fallback, Err(RowSkip::TooFewFactors(0)));
    }

    #[test]
    fn rows_without_product_or_factors_are_skipped() {
        let registry = SchemaRegistry::standard();
        let index = HeaderIndex::new(&headers(&[
            "location_id",
            "product",
            "roof_area_sqm",
            "solar_irradiation",
            "roof_tilt_degrees",
        ]));
        let context = RowContext {
            index: &index,
            sheet: "upload",
            sheet_product: None,
            registry: &registry,
            min_factors: 3,
        };

        assert_eq!(
            context.extract(&row(&["1", "", "250", "1100", "30"]), 0),
            Err(RowSkip::MissingProduct)
        );
        assert_eq!(
            context.extract(&row(&["1", "Wind", "250", "1100", "30"]), 0),
            Err(RowSkip::UnknownProduct("Wind".to_string()))
        );
        assert_eq!(
            context.extract(&row(&["1", "pv", "250", "n/a", "30"]), 0),
            Err(RowSkip::TooFewFactors(2))
        );
        assert_eq!(
            context.extract(&row(&["", "", "", "", ""]), 0),
            Err(RowSkip::Blank)
        );
    }

    #[test]
    fn short_rows_and_missing_identity_default() {
        let registry = SchemaRegistry::standard();
        let index = HeaderIndex::new(&headers(&[
            "product",
            "roof_area_sqm",
            "solar_irradiation",
            "roof_tilt_degrees",
            "location_id",
        ]));
        let context = RowContext {
            index: &index,
            sheet: "upload",
            sheet_product: None,
            registry: &registry,
            min_factors: 3,
        };

        let draft = context
            .extract(&row(&["PV", "250", "1100", "30"]), 4)
            .expect("short row accepted");
        assert_eq!(draft.location_id, 0);
        assert_eq!(draft.location_name, "");
        assert_eq!(
            draft.origin,
            Some(RowOrigin {
                sheet: "upload".to_string(),
                row_index: 4
            })
        );
    }
}
