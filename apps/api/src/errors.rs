use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scanner::ScannerError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Scanner(#[from] ScannerError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// `{"error": "<message>"}`, the shape the form front-end on `/analyze`
    /// renders directly.
    pub fn into_plain_response(self) -> Response {
        let (status, _, message) = self.parts();
        (status, Json(json!({ "error": message }))).into_response()
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Scanner(e @ ScannerError::Extraction(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                e.to_string(),
            ),
            AppError::Scanner(e @ ScannerError::PatternLoad { .. }) => {
                tracing::error!("Pattern vocabulary error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PATTERN_LOAD_ERROR",
                    e.to_string(),
                )
            }
            AppError::Scanner(e @ ScannerError::Domain(_)) => {
                tracing::error!("Scoring error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DOMAIN_ERROR", e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

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
    fn test_validation_maps_to_bad_request() {
        let (status, code, message) = AppError::Validation("Missing file or description".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "Missing file or description");
    }

    #[test]
    fn test_extraction_error_is_surfaced_as_unprocessable() {
        let err: AppError = ScannerError::Extraction("not a PDF".into()).into();
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "EXTRACTION_ERROR");
        assert!(message.contains("not a PDF"));
    }

    #[test]
    fn test_internal_error_keeps_its_message() {
        let err = AppError::Internal(anyhow::anyhow!("worker vanished"));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(message.contains("worker vanished"));
    }

    #[test]
    fn test_payload_too_large_maps_to_413() {
        let (status, code, _) = AppError::PayloadTooLarge("body over limit".into()).parts();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(code, "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_plain_response_has_string_error() {
        let response = AppError::Validation("Invalid file type".into()).into_plain_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Invalid file type" }));
    }

    #[test]
    fn test_domain_error_maps_to_500() {
        let err: AppError = ScannerError::Domain("zero vector".into()).into();
        assert_eq!(err.parts().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
