use super::{attachment, ScoringState};
use crate::error::AppError;
use crate::export::ExportFormat;
use crate::templates::{
    csv_template, excel_template, mock_workbook, CSV_TEMPLATE_FILENAME, EXCEL_TEMPLATE_FILENAME,
    MOCK_FILENAME,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::Deserialize;

pub(crate) async fn csv_template_handler(
    State(state): State<ScoringState>,
) -> Result<Response, AppError> {
    let body = csv_template(state.registry)?;
    Ok(attachment(
        ExportFormat::Csv.content_type(),
        CSV_TEMPLATE_FILENAME,
        body,
    ))
}

pub(crate) async fn excel_template_handler(
    State(state): State<ScoringState>,
) -> Result<Response, AppError> {
    let body = excel_template(state.registry)?;
    Ok(attachment(
        ExportFormat::Xlsx.content_type(),
        EXCEL_TEMPLATE_FILENAME,
        body,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MockQuery {
    seed: Option<u64>,
}

pub(crate) async fn mock_workbook_handler(
    query: Result<Query<MockQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query
        .map_err(|_| AppError::Validation("seed muss eine positive ganze Zahl sein".to_string()))?;
    let body = mock_workbook(query.seed)?;
    Ok(attachment(
        ExportFormat::Xlsx.content_type(),
        MOCK_FILENAME,
        body,
    ))
}
