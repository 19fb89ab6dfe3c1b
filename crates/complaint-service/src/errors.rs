use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsError {
    /// Missing or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate value for a unique field.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Role or ownership violation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not allowed in the complaint's current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl CsError {
    /// HTTP status and stable error code for this variant.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            CsError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CsError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            CsError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            CsError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            CsError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            CsError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CsError::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            CsError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            CsError::Crypto(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CRYPTO_ERROR"),
            CsError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for CsError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            CsError::Validation(msg)
            | CsError::Conflict(msg)
            | CsError::InvalidToken(msg)
            | CsError::Forbidden(msg)
            | CsError::NotFound(msg)
            | CsError::InvalidState(msg) => msg.clone(),
            CsError::InvalidCredentials => "Invalid email or password".to_string(),
            CsError::Database(detail) => {
                tracing::error!(target: "cs.errors", error = %detail, "Database error");
                "An internal database error occurred".to_string()
            }
            CsError::Crypto(detail) => {
                tracing::error!(target: "cs.errors", error = %detail, "Cryptographic error");
                "An internal cryptographic error occurred".to_string()
            }
            CsError::Internal => "An internal error occurred".to_string(),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
