use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::UserError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": title, "code": n, "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub code: Option<u16>,
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.title, code: self.code, detail: self.detail.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<UserError> for JsonApiError {
    fn from(err: UserError) -> Self {
        let (status, title) = match &err {
            UserError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            UserError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            UserError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            UserError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        // store details stay in the log
        let detail = match &err {
            UserError::Store(_) => {
                error!(code = err.code(), error = %err, "request failed in store");
                None
            }
            _ => Some(err.to_string()),
        };
        Self { status, title, code: Some(err.code()), detail }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
