use super::schema::{FactorDefinition, ValueType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw factor value after it has been resolved against its definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    Number(f64),
    Flag(bool),
    Category(String),
}

/// Recognized factors of one location, keyed by factor key.
pub type FactorSet = BTreeMap<String, FactorValue>;

const TRUTHY_TOKENS: [&str; 4] = ["ja", "yes", "true", "1"];

pub fn is_truthy_token(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&lowered.as_str())
}

/// Strict float parse; blanks and non-finite values are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

impl FactorValue {
    /// Resolve text input. `None` means the factor is omitted.
    pub fn from_text(raw: &str, definition: &FactorDefinition) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match definition.value_type() {
            ValueType::Numeric => parse_number(trimmed).map(FactorValue::Number),
            ValueType::Boolean => Some(FactorValue::Flag(is_truthy_token(trimmed))),
            ValueType::Categorical => Some(FactorValue::Category(trimmed.to_string())),
        }
    }

    pub fn from_number(value: f64, definition: &FactorDefinition) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        match definition.value_type() {
            ValueType::Numeric => Some(FactorValue::Number(value)),
            ValueType::Boolean => Some(FactorValue::Flag(value > 0.0)),
            ValueType::Categorical => Some(FactorValue::Category(format_number(value))),
        }
    }

    pub fn from_flag(value: bool, definition: &FactorDefinition) -> Option<Self> {
        match definition.value_type() {
            ValueType::Boolean => Some(FactorValue::Flag(value)),
            ValueType::Categorical => Some(FactorValue::Category(value.to_string())),
            ValueType::Numeric => None,
        }
    }

    /// Resolve a JSON value from a manual entry payload.
    pub fn from_json(value: &Value, definition: &FactorDefinition) -> Option<Self> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .and_then(|number| Self::from_number(number, definition)),
            Value::Bool(flag) => Self::from_flag(*flag, definition),
            Value::String(text) => Self::from_text(text, definition),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Text form used when writing the value back into a table.
    pub fn to_cell_text(&self) -> String {
        match self {
            FactorValue::Number(value) => format_number(*value),
            FactorValue::Flag(flag) => flag.to_string(),
            FactorValue::Category(category) => category.clone(),
        }
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Resolve every schema factor present in a JSON object.
pub fn resolve_json_factors<'a, I>(
    factors: &serde_json::Map<String, Value>,
    definitions: I,
) -> FactorSet
where
    I: IntoIterator<Item = &'a FactorDefinition>,
{
    definitions
        .into_iter()
        .filter_map(|definition| {
            factors
                .get(definition.key)
                .and_then(|raw| FactorValue::from_json(raw, definition))
                .map(|value| (definition.key.to_string(), value))
        })
        .collect()
}
