use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::interview::InterviewError;
use crate::layout::PdfError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Speech capture unavailable: {0}")]
    SpeechUnavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat(_) => AppError::UnsupportedMediaType(e.to_string()),
            ExtractError::Pdf(_) | ExtractError::Docx(_) | ExtractError::EmptyDocument => {
                AppError::UnprocessableEntity(e.to_string())
            }
        }
    }
}

impl From<InterviewError> for AppError {
    fn from(e: InterviewError) -> Self {
        match e {
            InterviewError::EmptyAnswer => AppError::Validation(e.to_string()),
            InterviewError::SpeechUnavailable => AppError::SpeechUnavailable(e.to_string()),
            InterviewError::Finished => AppError::Conflict(e.to_string()),
            InterviewError::SessionClosed => AppError::NotFound(e.to_string()),
        }
    }
}

impl From<PdfError> for AppError {
    fn from(e: PdfError) -> Self {
        AppError::Internal(anyhow::anyhow!("PDF generation failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingCredential(msg) => {
                (StatusCode::BAD_REQUEST, "MISSING_CREDENTIAL", msg.clone())
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::SpeechUnavailable(msg) => {
                (StatusCode::CONFLICT, "SPEECH_UNAVAILABLE", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    format!("Error processing resume: {msg}"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_answer_maps_to_bad_request() {
        let response = AppError::from(InterviewError::EmptyAnswer).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_speech_unavailable_maps_to_conflict() {
        let response = AppError::from(InterviewError::SpeechUnavailable).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unsupported_format_maps_to_415() {
        let err = ExtractError::UnsupportedFormat("image/png".to_string());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_llm_error_maps_to_bad_gateway() {
        let err = LlmError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
