use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AppError, ErrorBody, ResumeError};
use crate::llm_client::AttemptRecord;
use crate::models::resume::{ParsedResume, StoredResume};
use crate::resume::sample::sample_resume;
use crate::resume::store::{create_resume, get_resume};
use crate::resume::upload::ResumeUpload;
use crate::routes::MAX_BODY_BYTES;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ParseQuery {
    /// Substitute the sample portfolio instead of failing.
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    Parsed,
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub source: ResumeSource,
    pub resume: ParsedResume,
    pub attempts: Vec<AttemptRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CreateResumeResponse {
    pub id: String,
}

/// POST /api/resumes/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let upload = read_upload(&headers, multipart).await?;
    let report = state.pipeline.run(&upload).await;

    match report.outcome {
        Ok(resume) => Ok(Json(ParseResponse {
            source: ResumeSource::Parsed,
            resume,
            attempts: report.attempts,
            error: None,
        })),
        Err(failure) if query.fallback => {
            tracing::info!(
                kind = ?failure.error.kind(),
                "Serving sample resume in place of failed parse"
            );
            Ok(Json(ParseResponse {
                source: ResumeSource::Fallback,
                resume: sample_resume(),
                attempts: report.attempts,
                error: Some(ErrorBody::from(&failure.error)),
            }))
        }
        Err(failure) => Err(failure.error.into()),
    }
}

/// Pulls the `file` field out of a multipart body.
async fn read_upload(
    headers: &HeaderMap,
    mut multipart: Multipart,
) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(headers, e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(headers, e))?;
        return Ok(ResumeUpload::new(file_name, bytes));
    }
    Err(AppError::Validation("No file uploaded".to_string()))
}

/// A body cut off by the request size limit is still an oversized file.
fn upload_error(headers: &HeaderMap, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let size_bytes = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(MAX_BODY_BYTES as u64);
        return ResumeError::FileTooLarge { size_bytes }.into();
    }
    AppError::Validation(format!("Malformed upload: {e}"))
}

/// GET /api/resumes/sample
pub async fn handle_sample() -> Json<ParsedResume> {
    Json(sample_resume())
}

/// POST /api/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<CreateResumeResponse>), AppError> {
    let data = req
        .data
        .ok_or_else(|| AppError::Validation("No resume data provided".to_string()))?;
    let id = create_resume(&state.db, &data).await?;
    Ok((StatusCode::CREATED, Json(CreateResumeResponse { id })))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredResume>, AppError> {
    get_resume(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}
