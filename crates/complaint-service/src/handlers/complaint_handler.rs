//! Complaint handlers.
//!
//! All routes here sit behind `require_auth`; the caller arrives as an
//! `Extension<AuthenticatedUser>` and is passed to the service explicitly.
//!
//! # Error Responses
//!
//! - 400 Bad Request: invalid body, invalid status/priority, or the
//!   complaint is no longer Pending
//! - 401 Unauthorized: missing or invalid token
//! - 403 Forbidden: role or ownership violation
//! - 404 Not Found: unknown or malformed complaint id

use crate::errors::CsError;
use crate::handlers::parse_json_body;
use crate::models::{
    AuthenticatedUser, ComplaintResponse, CreateComplaintRequest, DeleteComplaintResponse,
    UpdateComplaintRequest,
};
use crate::routes::AppState;
use crate::services::complaint_service;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Malformed ids are reported as missing complaints.
fn parse_complaint_id(raw: &str) -> Result<Uuid, CsError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!(target: "cs.handlers.complaints", "Malformed complaint id");
        CsError::NotFound("Complaint not found".to_string())
    })
}

/// Handler for POST /api/complaints
#[instrument(skip_all, name = "cs.handlers.create_complaint")]
pub async fn create_complaint(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<ComplaintResponse>), CsError> {
    let request: CreateComplaintRequest = parse_json_body(&body)?;
    let new = request.validate()?;

    let complaint = complaint_service::create(&state.pool, &caller, new).await?;

    Ok((StatusCode::CREATED, Json(complaint.into())))
}

/// Handler for GET /api/complaints
///
/// Query parameters (such as a client cache-buster) are ignored.
#[instrument(skip_all, name = "cs.handlers.list_complaints")]
pub async fn list_complaints(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<ComplaintResponse>>, CsError> {
    let complaints = complaint_service::list(&state.pool, &caller).await?;

    Ok(Json(complaints.into_iter().map(Into::into).collect()))
}

/// Handler for GET /api/complaints/:id
#[instrument(skip_all, name = "cs.handlers.get_complaint")]
pub async fn get_complaint(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ComplaintResponse>, CsError> {
    let complaint_id = parse_complaint_id(&id)?;

    let complaint = complaint_service::get(&state.pool, &caller, complaint_id).await?;

    Ok(Json(complaint.into()))
}

/// Handler for PATCH /api/complaints/:id
#[instrument(skip_all, name = "cs.handlers.update_complaint")]
pub async fn update_complaint(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ComplaintResponse>, CsError> {
    let complaint_id = parse_complaint_id(&id)?;
    let request: UpdateComplaintRequest = parse_json_body(&body)?;
    let patch = request.validate()?;

    let complaint = complaint_service::update(&state.pool, &caller, complaint_id, patch).await?;

    Ok(Json(complaint.into()))
}

/// Handler for DELETE /api/complaints/:id
#[instrument(skip_all, name = "cs.handlers.delete_complaint")]
pub async fn delete_complaint(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteComplaintResponse>, CsError> {
    let complaint_id = parse_complaint_id(&id)?;

    let id = complaint_service::delete(&state.pool, &caller, complaint_id).await?;

    Ok(Json(DeleteComplaintResponse { id }))
}
