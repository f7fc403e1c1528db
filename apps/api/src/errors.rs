use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Session busy: {0}")]
    Busy(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, shared by HTTP bodies and inline batch errors.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Busy(_) => "SESSION_BUSY",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Extraction(msg)
            | AppError::Busy(msg) => msg.clone(),
            AppError::ExternalService(_) => {
                "The analysis service could not complete the request. Please try again."
                    .to_string()
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(msg) => {
                tracing::warn!("Validation error: {msg}");
                StatusCode::BAD_REQUEST
            }
            AppError::Extraction(msg) => {
                tracing::warn!("Extraction error: {msg}");
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ExternalService(msg) => {
                tracing::error!("External service error: {msg}");
                StatusCode::BAD_GATEWAY
            }
            AppError::Busy(_) => StatusCode::CONFLICT,
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}
