//! Complaint repository module for database operations.
//!
//! Every read joins the owner's public fields from `users`. Owner-side
//! mutations are conditional on `status = 'Pending'` inside the statement
//! itself, so a concurrent admin status change always wins over a stale
//! owner edit or delete.

use crate::errors::CsError;
use crate::models::{Complaint, ComplaintStatus, ContentChanges, NewComplaint, Priority};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Complaint row joined with its owner (maps to `complaints JOIN users`)
#[derive(Debug, Clone, sqlx::FromRow)]
struct ComplaintRow {
    complaint_id: Uuid,
    owner_id: Uuid,
    owner_name: String,
    owner_email: String,
    category: String,
    description: String,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = CsError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        let priority = row
            .priority
            .parse::<Priority>()
            .map_err(|e| CsError::Database(format!("Corrupt complaint row: {}", e)))?;
        let status = row
            .status
            .parse::<ComplaintStatus>()
            .map_err(|e| CsError::Database(format!("Corrupt complaint row: {}", e)))?;

        Ok(Complaint {
            complaint_id: row.complaint_id,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            owner_email: row.owner_email,
            category: row.category,
            description: row.description,
            priority,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Columns selected from `c` (complaints or a CTE over it) joined with `u` (users).
const COMPLAINT_COLUMNS: &str = r#"
    c.complaint_id, c.user_id AS owner_id, u.name AS owner_name, u.email AS owner_email,
    c.category, c.description, c.priority, c.status, c.created_at, c.updated_at
"#;

fn into_complaints(rows: Vec<ComplaintRow>) -> Result<Vec<Complaint>, CsError> {
    rows.into_iter().map(Complaint::try_from).collect()
}

/// Insert a complaint owned by `owner_id` in the Pending state.
pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    new: &NewComplaint,
) -> Result<Complaint, CsError> {
    let query = format!(
        r#"
        WITH c AS (
            INSERT INTO complaints (user_id, category, description, priority)
            VALUES ($1, $2, $3, $4)
            RETURNING *
        )
        SELECT {COMPLAINT_COLUMNS}
        FROM c
        JOIN users u ON u.user_id = c.user_id
        "#
    );

    let row = sqlx::query_as::<_, ComplaintRow>(&query)
        .bind(owner_id)
        .bind(&new.category)
        .bind(&new.description)
        .bind(new.priority.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| CsError::Database(format!("Failed to create complaint: {}", e)))?;

    row.try_into()
}

/// Get a complaint by id.
pub async fn get_by_id(pool: &PgPool, complaint_id: Uuid) -> Result<Option<Complaint>, CsError> {
    let query = format!(
        r#"
        SELECT {COMPLAINT_COLUMNS}
        FROM complaints c
        JOIN users u ON u.user_id = c.user_id
        WHERE c.complaint_id = $1
        "#
    );

    let row = sqlx::query_as::<_, ComplaintRow>(&query)
        .bind(complaint_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| CsError::Database(format!("Failed to fetch complaint: {}", e)))?;

    row.map(Complaint::try_from).transpose()
}

/// All complaints, newest first.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Complaint>, CsError> {
    let query = format!(
        r#"
        SELECT {COMPLAINT_COLUMNS}
        FROM complaints c
        JOIN users u ON u.user_id = c.user_id
        ORDER BY c.created_at DESC, c.complaint_id DESC
        "#
    );

    let rows = sqlx::query_as::<_, ComplaintRow>(&query)
        .fetch_all(pool)
        .await
        .map_err(|e| CsError::Database(format!("Failed to list complaints: {}", e)))?;

    into_complaints(rows)
}

/// Complaints owned by `owner_id`, newest first.
pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Complaint>, CsError> {
    let query = format!(
        r#"
        SELECT {COMPLAINT_COLUMNS}
        FROM complaints c
        JOIN users u ON u.user_id = c.user_id
        WHERE c.user_id = $1
        ORDER BY c.created_at DESC, c.complaint_id DESC
        "#
    );

    let rows = sqlx::query_as::<_, ComplaintRow>(&query)
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| CsError::Database(format!("Failed to list complaints by owner: {}", e)))?;

    into_complaints(rows)
}

/// Set the status of any complaint.
///
/// Returns `None` if the complaint does not exist.
pub async fn update_status(
    pool: &PgPool,
    complaint_id: Uuid,
    status: ComplaintStatus,
) -> Result<Option<Complaint>, CsError> {
    let query = format!(
        r#"
        WITH c AS (
            UPDATE complaints
            SET status = $2, updated_at = clock_timestamp()
            WHERE complaint_id = $1
            RETURNING *
        )
        SELECT {COMPLAINT_COLUMNS}
        FROM c
        JOIN users u ON u.user_id = c.user_id
        "#
    );

    let row = sqlx::query_as::<_, ComplaintRow>(&query)
        .bind(complaint_id)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await
        .map_err(|e| CsError::Database(format!("Failed to update complaint status: {}", e)))?;

    row.map(Complaint::try_from).transpose()
}

/// Apply content changes, and optionally a status change, if the complaint is
/// owned by `owner_id` and still Pending.
///
/// Both changes land in one statement. Fields left as `None` keep their
/// stored value. Returns `None` when no row matched (missing, not owned, or
/// no longer Pending).
pub async fn update_pending(
    pool: &PgPool,
    complaint_id: Uuid,
    owner_id: Uuid,
    changes: &ContentChanges,
    status: Option<ComplaintStatus>,
) -> Result<Option<Complaint>, CsError> {
    let query = format!(
        r#"
        WITH c AS (
            UPDATE complaints
            SET category = COALESCE($3, category),
                description = COALESCE($4, description),
                priority = COALESCE($5, priority),
                status = COALESCE($6, status),
                updated_at = clock_timestamp()
            WHERE complaint_id = $1 AND user_id = $2 AND status = 'Pending'
            RETURNING *
        )
        SELECT {COMPLAINT_COLUMNS}
        FROM c
        JOIN users u ON u.user_id = c.user_id
        "#
    );

    let row = sqlx::query_as::<_, ComplaintRow>(&query)
        .bind(complaint_id)
        .bind(owner_id)
        .bind(changes.category.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.priority.map(|p| p.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(pool)
        .await
        .map_err(|e| CsError::Database(format!("Failed to update complaint: {}", e)))?;

    row.map(Complaint::try_from).transpose()
}

/// Delete a complaint regardless of owner or status.
///
/// Returns `true` if a row was deleted.
pub async fn delete_any(pool: &PgPool, complaint_id: Uuid) -> Result<bool, CsError> {
    let result = sqlx::query(
        r#"
        DELETE FROM complaints
        WHERE complaint_id = $1
        "#,
    )
    .bind(complaint_id)
    .execute(pool)
    .await
    .map_err(|e| CsError::Database(format!("Failed to delete complaint: {}", e)))?;

    Ok(result.rows_affected() > 0)
}

/// Delete a complaint if it is owned by `owner_id` and still Pending.
///
/// Returns `true` if a row was deleted.
pub async fn delete_if_pending(
    pool: &PgPool,
    complaint_id: Uuid,
    owner_id: Uuid,
) -> Result<bool, CsError> {
    let result = sqlx::query(
        r#"
        DELETE FROM complaints
        WHERE complaint_id = $1 AND user_id = $2 AND status = 'Pending'
        "#,
    )
    .bind(complaint_id)
    .bind(owner_id)
    .execute(pool)
    .await
    .map_err(|e| CsError::Database(format!("Failed to delete complaint: {}", e)))?;

    Ok(result.rows_affected() > 0)
}
