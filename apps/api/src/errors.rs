use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::resume::schema::SchemaError;

/// Classified failure kinds of the resume pipeline.
/// Copyable tag used for pattern matching, the attempt log and API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidFormat,
    FileTooLarge,
    FileError,
    EmptyFile,
    TooShort,
    MissingCredential,
    Timeout,
    AuthError,
    RateLimited,
    ServiceUnavailable,
    InvalidResponse,
    ParseError,
    SchemaError,
    NetworkError,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::FileTooLarge => "FILE_TOO_LARGE",
            ErrorKind::FileError => "FILE_ERROR",
            ErrorKind::EmptyFile => "EMPTY_FILE",
            ErrorKind::TooShort => "TOO_SHORT",
            ErrorKind::MissingCredential => "MISSING_CREDENTIAL",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::AuthError => "AUTH_ERROR",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::InvalidResponse => "INVALID_RESPONSE",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::SchemaError => "SCHEMA_ERROR",
            ErrorKind::NetworkError => "NETWORK_ERROR",
        }
    }
}

/// Every way the resume pipeline can fail. Each variant maps to exactly one [`ErrorKind`]
/// and carries the structured cause (provider status, provider message, schema reason).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResumeError {
    #[error("Please upload a Word document (.docx)")]
    InvalidFormat,

    #[error("File size must be less than 5MB (got {size_bytes} bytes)")]
    FileTooLarge { size_bytes: u64 },

    #[error("Unable to read the file. Please ensure it's a valid Word document: {0}")]
    FileError(String),

    #[error("The document appears to be empty")]
    EmptyFile,

    #[error("The document contains too little text to be a valid resume")]
    TooShort { chars: usize },

    #[error("Service configuration is incomplete. Please try again later.")]
    MissingCredential,

    #[error("The request took too long to complete. Please try again.")]
    Timeout { status: Option<u16> },

    #[error("Unable to authenticate with the service: {message}")]
    Auth { status: u16, message: String },

    #[error("Too many requests. Please try again in a few minutes.")]
    RateLimited { message: String },

    #[error("Service temporarily unavailable (status {status}). Please try again later.")]
    ServiceUnavailable { status: u16, message: String },

    #[error("Received an invalid response from the service: {0}")]
    InvalidResponse(String),

    #[error("Unable to process the resume. Please ensure it's properly formatted: {0}")]
    Parse(String),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("Unable to connect to the service: {message}")]
    Network { status: Option<u16>, message: String },
}

impl ResumeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResumeError::InvalidFormat => ErrorKind::InvalidFormat,
            ResumeError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            ResumeError::FileError(_) => ErrorKind::FileError,
            ResumeError::EmptyFile => ErrorKind::EmptyFile,
            ResumeError::TooShort { .. } => ErrorKind::TooShort,
            ResumeError::MissingCredential => ErrorKind::MissingCredential,
            ResumeError::Timeout { .. } => ErrorKind::Timeout,
            ResumeError::Auth { .. } => ErrorKind::AuthError,
            ResumeError::RateLimited { .. } => ErrorKind::RateLimited,
            ResumeError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            ResumeError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ResumeError::Parse(_) => ErrorKind::ParseError,
            ResumeError::Schema(_) => ErrorKind::SchemaError,
            ResumeError::Network { .. } => ErrorKind::NetworkError,
        }
    }

    /// HTTP status reported by the completion provider, when the failure came from one.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            ResumeError::Auth { status, .. } | ResumeError::ServiceUnavailable { status, .. } => {
                Some(*status)
            }
            ResumeError::Timeout { status } | ResumeError::Network { status, .. } => *status,
            ResumeError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Whether another completion attempt could plausibly succeed.
    /// Credential rejections and non-transient 4xx responses cannot heal within one invocation.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResumeError::Timeout { .. }
            | ResumeError::RateLimited { .. }
            | ResumeError::ServiceUnavailable { .. } => true,
            ResumeError::Network { status, .. } => status.is_none(),
            _ => false,
        }
    }
}

/// Error body shared by failed requests and fallback responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&ResumeError> for ErrorBody {
    fn from(e: &ResumeError) -> Self {
        ErrorBody {
            code: e.kind().code(),
            message: e.to_string(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn resume_status(e: &ResumeError) -> StatusCode {
    match e.kind() {
        ErrorKind::InvalidFormat
        | ErrorKind::FileError
        | ErrorKind::EmptyFile
        | ErrorKind::TooShort => StatusCode::BAD_REQUEST,
        ErrorKind::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::ParseError | ErrorKind::SchemaError => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::RateLimited | ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::AuthError | ErrorKind::InvalidResponse | ErrorKind::NetworkError => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Resume(e) => {
                let status = resume_status(e);
                if status.is_server_error() {
                    tracing::error!(
                        provider_status = ?e.provider_status(),
                        "Resume pipeline error: {e}"
                    );
                }
                (status, e.kind().code(), e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
