//! Complaint service: the complaint lifecycle behind the HTTP handlers.
//!
//! Each operation loads the complaint, asks [`crate::policy`] for a
//! decision, then performs the write. Owner-side writes are conditional in
//! SQL; when such a write matches nothing the complaint is re-read to tell
//! a concurrent delete (`NotFound`) from a concurrent status change
//! (`InvalidState`).

use crate::errors::CsError;
use crate::models::{AuthenticatedUser, Complaint, ComplaintPatch, NewComplaint};
use crate::observability::metrics::record_complaint_operation;
use crate::observability::{hash_for_correlation, outcome_label};
use crate::policy::{self, DeleteMode, ListScope};
use crate::repositories::complaints;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

fn not_found() -> CsError {
    CsError::NotFound("Complaint not found".to_string())
}

async fn load(pool: &PgPool, complaint_id: Uuid) -> Result<Complaint, CsError> {
    complaints::get_by_id(pool, complaint_id)
        .await?
        .ok_or_else(not_found)
}

/// Re-read after a conditional write matched no row.
async fn explain_missed_write(pool: &PgPool, complaint_id: Uuid, deleting: bool) -> CsError {
    match complaints::get_by_id(pool, complaint_id).await {
        Ok(Some(_)) => policy::lost_pending_race(deleting),
        Ok(None) => not_found(),
        Err(e) => e,
    }
}

/// File a complaint owned by the caller.
#[instrument(skip_all, name = "cs.service.create_complaint")]
pub async fn create(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    new: NewComplaint,
) -> Result<Complaint, CsError> {
    let result = complaints::create(pool, caller.user_id, &new).await;
    record_complaint_operation("create", outcome_label(&result));

    if let Ok(complaint) = &result {
        tracing::info!(
            target: "cs.service.complaints",
            complaint_id = %complaint.complaint_id,
            owner = %hash_for_correlation(&caller.user_id.to_string()),
            priority = complaint.priority.as_str(),
            "Complaint created"
        );
    }

    result
}

/// Complaints visible to the caller, newest first.
#[instrument(skip_all, name = "cs.service.list_complaints")]
pub async fn list(pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<Complaint>, CsError> {
    let result = match policy::list_scope(caller) {
        ListScope::All => complaints::list_all(pool).await,
        ListScope::OwnedBy(owner_id) => complaints::list_by_owner(pool, owner_id).await,
    };
    record_complaint_operation("list", outcome_label(&result));
    result
}

/// A single complaint, if the caller may see it.
#[instrument(skip_all, name = "cs.service.get_complaint", fields(complaint_id = %complaint_id))]
pub async fn get(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    complaint_id: Uuid,
) -> Result<Complaint, CsError> {
    let result = get_inner(pool, caller, complaint_id).await;
    record_complaint_operation("get", outcome_label(&result));
    result
}

async fn get_inner(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    complaint_id: Uuid,
) -> Result<Complaint, CsError> {
    let complaint = load(pool, complaint_id).await?;
    policy::authorize_read(caller, complaint.owner_id)?;
    Ok(complaint)
}

/// Apply a validated patch.
///
/// A patch with content changes is one conditional statement on Pending,
/// carrying any status change with it, so an admin editing their own
/// complaint and moving it out of Pending gets both or neither.
#[instrument(skip_all, name = "cs.service.update_complaint", fields(complaint_id = %complaint_id))]
pub async fn update(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    complaint_id: Uuid,
    patch: ComplaintPatch,
) -> Result<Complaint, CsError> {
    let result = update_inner(pool, caller, complaint_id, patch).await;
    record_complaint_operation("update", outcome_label(&result));
    result
}

async fn update_inner(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    complaint_id: Uuid,
    patch: ComplaintPatch,
) -> Result<Complaint, CsError> {
    let current = load(pool, complaint_id).await?;
    policy::authorize_update(caller, current.owner_id, current.status, &patch)?;
    let from = current.status;

    let updated = if patch.content.is_empty() {
        match patch.status {
            Some(status) => complaints::update_status(pool, complaint_id, status)
                .await?
                .ok_or_else(not_found)?,
            None => current,
        }
    } else {
        match complaints::update_pending(
            pool,
            complaint_id,
            caller.user_id,
            &patch.content,
            patch.status,
        )
        .await?
        {
            Some(updated) => updated,
            None => return Err(explain_missed_write(pool, complaint_id, false).await),
        }
    };

    if let Some(status) = patch.status {
        tracing::info!(
            target: "cs.service.complaints",
            complaint_id = %complaint_id,
            from = from.as_str(),
            to = status.as_str(),
            "Complaint status changed"
        );
    }

    Ok(updated)
}

/// Delete a complaint. Returns the deleted id.
#[instrument(skip_all, name = "cs.service.delete_complaint", fields(complaint_id = %complaint_id))]
pub async fn delete(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    complaint_id: Uuid,
) -> Result<Uuid, CsError> {
    let result = delete_inner(pool, caller, complaint_id).await;
    record_complaint_operation("delete", outcome_label(&result));
    result
}

async fn delete_inner(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    complaint_id: Uuid,
) -> Result<Uuid, CsError> {
    let complaint = load(pool, complaint_id).await?;

    let deleted = match policy::authorize_delete(caller, complaint.owner_id, complaint.status)? {
        DeleteMode::Any => complaints::delete_any(pool, complaint_id).await?,
        DeleteMode::OwnerWhilePending => {
            complaints::delete_if_pending(pool, complaint_id, caller.user_id).await?
        }
    };

    if !deleted {
        return Err(explain_missed_write(pool, complaint_id, true).await);
    }

    tracing::info!(
        target: "cs.service.complaints",
        complaint_id = %complaint_id,
        by_admin = caller.role.is_admin(),
        "Complaint deleted"
    );

    Ok(complaint_id)
}
