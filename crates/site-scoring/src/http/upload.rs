use super::{attachment, ScoringState};
use crate::error::AppError;
use crate::export::{download_filename, export_results, export_workbook, ExportFormat};
use crate::scoring::{score_all, ScoredLocation};
use crate::tabular::{parse_table, ParsedTable, TableFormat};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

const NO_FILE: &str = "Keine Datei hochgeladen";
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadQuery {
    format: Option<String>,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::Validation(format!("Ungültiger Upload: {error}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::Validation(format!("Ungültiger Upload: {error}")))?;
        return Ok(Upload { filename, bytes });
    }

    Err(AppError::Validation(NO_FILE.to_string()))
}

struct Scored {
    parsed: ParsedTable,
    results: Vec<ScoredLocation>,
}

fn parse_and_score(upload: &Upload, state: ScoringState) -> Result<Scored, AppError> {
    let parsed = parse_table(&upload.bytes, &upload.filename, state.registry, state.ingest)?;
    let results = score_all(parsed.drafts().iter().cloned(), state.registry);
    Ok(Scored { parsed, results })
}

pub(crate) async fn upload_score_handler(
    State(state): State<ScoringState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|error| AppError::Validation(error.body_text()))?;
    let requested = query
        .format
        .as_deref()
        .map(str::parse::<ExportFormat>)
        .transpose()
        .map_err(|error| AppError::Validation(error.to_string()))?;

    let mut multipart = multipart.map_err(|_| AppError::Validation(NO_FILE.to_string()))?;
    let upload = read_upload(&mut multipart).await?;

    let scored = tokio::task::spawn_blocking(move || {
        parse_and_score(&upload, state).map(|scored| (scored, upload.filename))
    })
    .await
    .map_err(|error| AppError::Server(axum::Error::new(error)))?;
    let (Scored { parsed, results }, filename) = scored?;

    let format = requested.unwrap_or(match parsed.format {
        TableFormat::Delimited => ExportFormat::Json,
        TableFormat::Workbook => ExportFormat::Xlsx,
    });

    info!(
        file = %filename,
        locations = results.len(),
        format = %format,
        "scored upload"
    );

    match format {
        ExportFormat::Json => {
            let body = export_results(&results, format, state.registry)?;
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, format.content_type())],
                body,
            )
                .into_response())
        }
        ExportFormat::Csv => {
            let body = export_results(&results, format, state.registry)?;
            let name = download_filename(&filename, format, chrono::Local::now().naive_local());
            Ok(attachment(format.content_type(), &name, body))
        }
        ExportFormat::Xlsx => {
            let body = export_workbook(&parsed, &results)?;
            let name = download_filename(&filename, format, chrono::Local::now().naive_local());
            Ok(attachment(format.content_type(), &name, body))
        }
    }
}
