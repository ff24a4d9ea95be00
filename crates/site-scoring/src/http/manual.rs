use super::ScoringState;
use crate::error::AppError;
use crate::scoring::{resolve_json_factors, score, FactorSet, Product, ScoreError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

const MISSING_FIELDS: &str = "location_name, product und factors sind erforderlich";

pub(crate) async fn product_factors_handler(
    State(state): State<ScoringState>,
    Path(product): Path<String>,
) -> Result<Response, AppError> {
    let product = product.to_lowercase();
    let schema = state
        .registry
        .schema_by_name(&product)
        .map_err(|error| AppError::NotFound(error.to_string()))?;

    Ok((StatusCode::OK, Json(schema)).into_response())
}

#[derive(Debug)]
struct ManualRequest {
    location_name: String,
    product: String,
    factors: Map<String, Value>,
}

impl ManualRequest {
    fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|error| AppError::Validation(format!("Ungültige JSON-Daten: {error}")))?;

        let field = |name: &str| payload.get(name);
        match (field("location_name"), field("product"), field("factors")) {
            (
                Some(Value::String(location_name)),
                Some(Value::String(product)),
                Some(Value::Object(factors)),
            ) => Ok(Self {
                location_name: location_name.clone(),
                product: product.clone(),
                factors: factors.clone(),
            }),
            _ => Err(AppError::Validation(MISSING_FIELDS.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
struct ManualScore {
    location_name: String,
    product: Product,
    score: f64,
    factors_used: FactorSet,
}

pub(crate) async fn manual_score_handler(
    State(state): State<ScoringState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = ManualRequest::from_body(&body)?;

    let product = request
        .product
        .parse::<Product>()
        .map_err(|_| ScoreError::UnknownProduct(request.product.clone()))?;
    let schema = state.registry.schema(product);
    let factors_used = resolve_json_factors(&request.factors, &schema.factors);
    let score = score(&factors_used, schema);

    debug!(
        product = %product,
        factors = factors_used.len(),
        score,
        "scored manual entry"
    );

    let body = ManualScore {
        location_name: request.location_name,
        product,
        score,
        factors_used,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}
