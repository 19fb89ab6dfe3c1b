//! Registration, login and current-user handlers.

use crate::errors::CsError;
use crate::handlers::parse_json_body;
use crate::models::{AuthResponse, AuthenticatedUser, LoginRequest, PublicUser, RegisterRequest};
use crate::routes::AppState;
use crate::services::auth_service;
use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/auth/register
///
/// Returns 201 with a token and the new user's public fields.
#[instrument(skip_all, name = "cs.handlers.register")]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AuthResponse>), CsError> {
    let request: RegisterRequest = parse_json_body(&body)?;

    let response = auth_service::register(&state.pool, &state.config, request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST /api/auth/login
#[instrument(skip_all, name = "cs.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AuthResponse>, CsError> {
    let request: LoginRequest = parse_json_body(&body)?;

    let response = auth_service::login(&state.pool, &state.config, request).await?;

    Ok(Json(response))
}

/// Handler for GET /api/auth/me
pub async fn get_me(Extension(caller): Extension<AuthenticatedUser>) -> Json<PublicUser> {
    Json(PublicUser::from(&caller))
}
