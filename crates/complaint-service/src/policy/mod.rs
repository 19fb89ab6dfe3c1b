//! Authorization policy for complaints.
//!
//! All role-based branching lives here. Functions are pure: they take the
//! caller and the current complaint facts and return the decision. Checks
//! run in a fixed order: ownership/role (`Forbidden`) before state
//! (`InvalidState`). Existence is checked by the caller before any of these.

use crate::errors::CsError;
use crate::models::{AuthenticatedUser, ComplaintPatch, ComplaintStatus};
use uuid::Uuid;

const NOT_OWNER: &str = "You are not allowed to access this complaint";
const STATUS_ADMIN_ONLY: &str = "Only admins can change complaint status";
const CONTENT_OWNER_ONLY: &str = "Only the owner can edit this complaint";
const DELETE_OWNER_ONLY: &str = "Only the owner can delete this complaint";
const NOT_PENDING_UPDATE: &str = "Complaint can only be edited while Pending";
const NOT_PENDING_DELETE: &str = "Complaint can only be deleted while Pending";

/// Which complaints a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    OwnedBy(Uuid),
}

/// How an authorized delete must be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Admin: unconditional.
    Any,
    /// Owner: only while the row is still Pending.
    OwnerWhilePending,
}

pub fn list_scope(caller: &AuthenticatedUser) -> ListScope {
    if caller.role.is_admin() {
        ListScope::All
    } else {
        ListScope::OwnedBy(caller.user_id)
    }
}

pub fn authorize_read(caller: &AuthenticatedUser, owner_id: Uuid) -> Result<(), CsError> {
    if caller.role.is_admin() || caller.user_id == owner_id {
        Ok(())
    } else {
        Err(CsError::Forbidden(NOT_OWNER.to_string()))
    }
}

/// Status transitions. Admins may set any value, including the current
/// one; nobody else may change status at all.
pub fn authorize_transition(
    caller: &AuthenticatedUser,
    _from: ComplaintStatus,
    _to: ComplaintStatus,
) -> Result<(), CsError> {
    if caller.role.is_admin() {
        Ok(())
    } else {
        Err(CsError::Forbidden(STATUS_ADMIN_ONLY.to_string()))
    }
}

/// Decide whether `patch` may be applied to a complaint owned by `owner_id`
/// that is currently in `status`.
///
/// # Errors
///
/// - `Forbidden` if a status change is requested by a non-admin, or a
///   content change by anyone other than the owner
/// - `InvalidState` if a content change targets a complaint that is no
///   longer Pending
pub fn authorize_update(
    caller: &AuthenticatedUser,
    owner_id: Uuid,
    status: ComplaintStatus,
    patch: &ComplaintPatch,
) -> Result<(), CsError> {
    if let Some(target) = patch.status {
        authorize_transition(caller, status, target)?;
    }

    if !patch.content.is_empty() {
        if caller.user_id != owner_id {
            return Err(CsError::Forbidden(CONTENT_OWNER_ONLY.to_string()));
        }
        if !status.is_owner_mutable() {
            return Err(CsError::InvalidState(NOT_PENDING_UPDATE.to_string()));
        }
    }

    Ok(())
}

/// Decide whether the caller may delete a complaint owned by `owner_id`
/// that is currently in `status`.
pub fn authorize_delete(
    caller: &AuthenticatedUser,
    owner_id: Uuid,
    status: ComplaintStatus,
) -> Result<DeleteMode, CsError> {
    if caller.role.is_admin() {
        return Ok(DeleteMode::Any);
    }
    if caller.user_id != owner_id {
        return Err(CsError::Forbidden(DELETE_OWNER_ONLY.to_string()));
    }
    if !status.is_owner_mutable() {
        return Err(CsError::InvalidState(NOT_PENDING_DELETE.to_string()));
    }
    Ok(DeleteMode::OwnerWhilePending)
}

/// Error for an owner-side conditional write that matched no row after the
/// policy allowed it: the status moved on in between.
pub fn lost_pending_race(deleting: bool) -> CsError {
    let message = if deleting {
        NOT_PENDING_DELETE
    } else {
        NOT_PENDING_UPDATE
    };
    CsError::InvalidState(message.to_string())
}
