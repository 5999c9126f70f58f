use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use matcher::MatchError;
use serde_json::json;
use thiserror::Error;

/// Handler error, rendered as `{"error": {"code", "message"}}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Search unavailable: no resumes indexed")]
    SearchUnavailable,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No valid .txt files were submitted")]
    NoValidFiles,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::EmptyCorpus => AppError::SearchUnavailable,
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::SearchUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SEARCH_UNAVAILABLE"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::NoValidFiles => (StatusCode::BAD_REQUEST, "NO_VALID_FILES"),
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        let message = match &self {
            AppError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
    }
}
