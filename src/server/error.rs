//! Translation of errors into HTTP responses.

use crate::error::PapercastError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl PapercastError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PapercastError::Validation(_) => StatusCode::BAD_REQUEST,
            PapercastError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PapercastError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            warn!(status = status.as_u16(), "Rejected request: {}", self);
        } else {
            error!(status = status.as_u16(), "Request failed: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Unwrap a JSON body, turning any rejection into a validation error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, PapercastError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| PapercastError::Validation(format!("Invalid JSON body: {}", e.body_text())))
}

/// Require a present, non-blank string field.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, PapercastError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PapercastError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PapercastError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (PapercastError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PapercastError::Extraction("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (PapercastError::Generation("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (PapercastError::Synthesis("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some("q".into()), "missing").unwrap(), "q");
        assert!(required(Some("  ".into()), "missing").is_err());
        let err = required(None, "Text not provided").unwrap_err();
        assert_eq!(err.to_string(), "Text not provided");
    }
}
