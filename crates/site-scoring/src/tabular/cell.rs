use crate::scoring::{format_number, parse_number, FactorDefinition, FactorValue};
use calamine::Data;

/// One cell of an uploaded table, independent of the source format.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Bool(flag) => flag.to_string(),
        }
    }

    /// Integer reading used for location ids; floats are truncated.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(value) if value.is_finite() => Some(value.trunc() as i64),
            CellValue::Text(text) => {
                let trimmed = text.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    parse_number(trimmed).map(|value| value.trunc() as i64)
                })
            }
            _ => None,
        }
    }

    pub fn to_factor(&self, definition: &FactorDefinition) -> Option<FactorValue> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(value) => FactorValue::from_number(*value, definition),
            CellValue::Text(text) => FactorValue::from_text(text, definition),
            CellValue::Bool(flag) => FactorValue::from_flag(*flag, definition),
        }
    }

    /// Display width in characters, used for column sizing.
    pub fn display_len(&self) -> usize {
        self.to_text().chars().count()
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(value) => CellValue::Number(*value as f64),
            Data::Float(value) => CellValue::Number(*value),
            Data::Bool(flag) => CellValue::Bool(*flag),
            Data::String(text) => CellValue::from_text(text),
            other => CellValue::from_text(&other.to_string()),
        }
    }
}
