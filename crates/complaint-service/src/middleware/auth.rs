//! Authentication middleware for protected routes.
//!
//! Extracts the Bearer token from the Authorization header, resolves it to
//! the current caller through [`auth_service::authenticate`], and injects
//! the resulting [`AuthenticatedUser`] into request extensions.

use crate::errors::CsError;
use crate::models::AuthenticatedUser;
use crate::routes::AppState;
use crate::services::auth_service;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Extract Bearer token from the Authorization header.
fn extract_bearer_token(req: &Request) -> Result<&str, CsError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "cs.middleware.auth", "Missing Authorization header");
            CsError::InvalidToken("Not authorized, no token".to_string())
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::debug!(target: "cs.middleware.auth", "Invalid Authorization header format");
            CsError::InvalidToken("Invalid Authorization header format".to_string())
        })
}

/// Authentication middleware.
///
/// # Response
///
/// - Returns 401 Unauthorized if token is missing or invalid, or its user
///   no longer exists
/// - Continues to next handler with `AuthenticatedUser` in extensions otherwise
#[instrument(skip_all, name = "cs.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, CsError> {
    let token = extract_bearer_token(&req)?;

    let caller: AuthenticatedUser =
        auth_service::authenticate(&state.pool, &state.config, token).await?;

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
