use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::{ProviderError, ProviderErrorKind};
use crate::models::generation::ConfigError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or blank provider credential. Raised before any extraction or network call.
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Upload exceeded the configured body limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    /// Maps a multipart read failure. Bodies over the upload limit keep their 413.
    pub fn from_multipart(context: &str, err: MultipartError) -> Self {
        let message = format!("{context}: {}", err.body_text());
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else {
            AppError::Validation(message)
        }
    }

    /// Status, machine-readable code, message and optional hint for the error envelope.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<&'static str>) {
        match self {
            AppError::Credential(msg) => (
                StatusCode::UNAUTHORIZED,
                "CREDENTIAL_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
                None,
            ),
            AppError::Extraction(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
                None,
            ),
            AppError::Provider(e) => {
                let status = match e.kind {
                    ProviderErrorKind::Authentication => StatusCode::UNAUTHORIZED,
                    ProviderErrorKind::ModelUnavailable => StatusCode::NOT_FOUND,
                    ProviderErrorKind::Quota => StatusCode::TOO_MANY_REQUESTS,
                    ProviderErrorKind::Generic => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind.code(), e.message.clone(), e.hint())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, hint) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(hint) = hint {
            error["hint"] = json!(hint);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
