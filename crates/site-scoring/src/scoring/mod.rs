mod aggregate;
mod normalize;
mod schema;
mod value;

pub use aggregate::{
    rank, round_one_decimal, score, score_all, score_product, LocationDraft, RowOrigin, ScoreError,
    ScoredLocation,
};
pub use normalize::{normalize, normalize_numeric, CATEGORICAL_NEUTRAL_SCORE};
pub use schema::{
    FactorDefinition, FactorKind, NumericBounds, OptimalPolicy, Product, ProductSchema,
    SchemaError, SchemaRegistry, SchemaVariant, ValueType, INDUSTRIES,
};
pub use value::{is_truthy_token, parse_number, resolve_json_factors, FactorSet, FactorValue};

pub(crate) use value::format_number;
