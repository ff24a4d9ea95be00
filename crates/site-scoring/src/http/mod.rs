//! HTTP endpoints for factor metadata, scoring and template downloads.

mod manual;
mod templates;
mod upload;

use crate::config::ScoringConfig;
use crate::scoring::SchemaRegistry;
use crate::tabular::IngestOptions;
use axum::{
    extract::DefaultBodyLimit,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

/// Read-only state shared by every scoring handler.
#[derive(Debug, Clone, Copy)]
pub struct ScoringState {
    pub registry: &'static SchemaRegistry,
    pub ingest: IngestOptions,
    pub max_upload_bytes: usize,
}

impl ScoringState {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            registry: SchemaRegistry::get(config.variant),
            ingest: config.ingest_options(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

impl Default for ScoringState {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

/// Router builder exposing the scoring API.
pub fn scoring_router(state: ScoringState) -> Router {
    Router::new()
        .route("/product-factors/:product", get(manual::product_factors_handler))
        .route("/score/manual", post(manual::manual_score_handler))
        .route("/score/csv", post(upload::upload_score_handler))
        .route("/template/csv", get(templates::csv_template_handler))
        .route("/template/excel", get(templates::excel_template_handler))
        .route("/template/mock", get(templates::mock_workbook_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}

pub(crate) fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
