//! HTTP request handlers for the complaint service.

pub mod auth_handler;
pub mod complaint_handler;
pub mod health;
pub mod metrics;

pub use auth_handler::{get_me, login, register};
pub use complaint_handler::{
    create_complaint, delete_complaint, get_complaint, list_complaints, update_complaint,
};
pub use health::{api_health, readiness_check};
pub use metrics::metrics_handler;

use crate::errors::CsError;
use axum::body::Bytes;
use serde::de::DeserializeOwned;

/// Deserialize a JSON body manually so malformed input is a 400
/// `VALIDATION_ERROR` rather than axum's default 422.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, CsError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "cs.handlers", error = %e, "Invalid request body");
        CsError::Validation("Invalid request body".to_string())
    })
}
