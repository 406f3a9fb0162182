use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::extraction::{
    extract_document, ExtractionError, ExtractionOptions, RawDocument, ValidatedText,
};
use crate::scoring::ScoreReport;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const JOB_ROLE_FIELD: &str = "job_role";

/// The parts of a multipart upload the ATS endpoints care about.
#[derive(Debug, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub job_role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file_name: Option<String>,
    pub extraction: ValidatedText,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub file_name: Option<String>,
    pub extraction: ValidatedText,
    pub report: ScoreReport,
}

/// POST /api/v1/ats/extract
#[instrument(skip_all)]
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let extraction = extract_upload(&upload, state.options).await?;

    Ok(Json(ExtractResponse {
        file_name: upload.file_name,
        extraction,
    }))
}

/// POST /api/v1/ats/score
#[instrument(skip_all)]
pub async fn handle_score(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScoreResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let extraction = extract_upload(&upload, state.options).await?;

    let report = state
        .scorer
        .score(&extraction.text, upload.job_role.as_deref())
        .await?;
    info!(
        overall_score = report.overall_score,
        backend = %report.scorer_backend,
        "Resume scored"
    );

    Ok(Json(ScoreResponse {
        file_name: upload.file_name,
        extraction,
        report,
    }))
}

/// Collects the `file` and `job_role` fields; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload = Upload::default();
    let mut has_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            FILE_FIELD => {
                upload.file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .filter(|n| !n.is_empty());
                upload.content_type = field.content_type().map(str::to_owned);
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                // Browsers send an unnamed empty part when no file was chosen.
                has_file = upload.file_name.is_some() || !upload.bytes.is_empty();
            }
            JOB_ROLE_FIELD => {
                let role = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                upload.job_role = Some(role.trim().to_owned()).filter(|r| !r.is_empty());
            }
            _ => {}
        }
    }

    if !has_file {
        return Err(ExtractionError::NoFileProvided.into());
    }
    Ok(upload)
}

/// Runs the synchronous extraction pipeline on the blocking pool.
async fn extract_upload(
    upload: &Upload,
    options: ExtractionOptions,
) -> Result<ValidatedText, AppError> {
    let bytes = upload.bytes.clone();
    let file_name = upload.file_name.clone();
    let content_type = upload.content_type.clone();
    info!(
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = bytes.len(),
        "Extracting uploaded document"
    );

    let extraction = tokio::task::spawn_blocking(move || {
        let doc = RawDocument {
            bytes: &bytes,
            file_name: file_name.as_deref(),
            content_type: content_type.as_deref(),
        };
        extract_document(&doc, &options)
    })
    .await
    .context("extraction task failed")??;

    Ok(extraction)
}
