use super::normalize::normalize;
use super::schema::{FactorKind, Product, ProductSchema, SchemaRegistry};
use super::value::{FactorSet, FactorValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScoreError {
    #[error("Ungültiges Produkt: {0}")]
    UnknownProduct(String),
}

/// Weighted sum of normalized factors on a 0–100 scale, one decimal place.
///
/// Missing numeric and boolean factors count as `0` before normalization;
/// a missing category contributes nothing.
pub fn score(factors: &FactorSet, schema: &ProductSchema) -> f64 {
    const MISSING: FactorValue = FactorValue::Number(0.0);

    let weighted: f64 = schema
        .factors
        .iter()
        .map(|definition| {
            let normalized = match (factors.get(definition.key), definition.kind) {
                (Some(value), _) => normalize(value, definition),
                (None, FactorKind::Categorical { .. }) => 0.0,
                (None, _) => normalize(&MISSING, definition),
            };
            definition.weight * normalized
        })
        .sum();

    round_one_decimal(weighted * 100.0).clamp(0.0, 100.0)
}

/// Score against the registry schema named by `product`.
pub fn score_product(
    factors: &FactorSet,
    product: &str,
    registry: &SchemaRegistry,
) -> Result<f64, ScoreError> {
    let schema = registry
        .schema_by_name(product)
        .map_err(|_| ScoreError::UnknownProduct(product.to_string()))?;
    Ok(score(factors, schema))
}

/// Half-away-from-zero rounding to one decimal.
pub fn round_one_decimal(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

/// Where a scored location came from inside an uploaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOrigin {
    pub sheet: String,
    pub row_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDraft {
    pub location_id: i64,
    pub location_name: String,
    pub product: Product,
    pub factors: FactorSet,
    #[serde(skip)]
    pub origin: Option<RowOrigin>,
}

/// A location with its computed score, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLocation {
    pub location_id: i64,
    pub location_name: String,
    pub product: Product,
    pub score: f64,
    pub factors_used: FactorSet,
    #[serde(skip)]
    pub origin: Option<RowOrigin>,
}

impl LocationDraft {
    pub fn score(self, registry: &SchemaRegistry) -> ScoredLocation {
        let score = score(&self.factors, registry.schema(self.product));
        ScoredLocation {
            location_id: self.location_id,
            location_name: self.location_name,
            product: self.product,
            score,
            factors_used: self.factors,
            origin: self.origin,
        }
    }
}

/// Score every draft, preserving input order.
pub fn score_all<I>(drafts: I, registry: &SchemaRegistry) -> Vec<ScoredLocation>
where
    I: IntoIterator<Item = LocationDraft>,
{
    drafts
        .into_iter()
        .map(|draft| draft.score(registry))
        .collect()
}

/// Stable sort by score, highest first.
pub fn rank(results: &mut [ScoredLocation]) {
    results.sort_by(|left, right| right.score.total_cmp(&left.score));
}
