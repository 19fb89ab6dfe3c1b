//! User repository module for database operations.
//!
//! Provides lookup and creation of user accounts. Emails are stored
//! normalized (trimmed, lowercased) by the caller.

use crate::errors::CsError;
use crate::models::{AuthenticatedUser, Role};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// User model (maps to users table)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Parsed role. The table's CHECK constraint keeps this infallible in
    /// practice; a bad value is logged and surfaces as an internal error.
    pub fn role(&self) -> Result<Role, CsError> {
        self.role.parse::<Role>().map_err(|e| {
            tracing::error!(target: "cs.repositories.users", error = %e, "Corrupt user row");
            CsError::Internal
        })
    }

    /// Identity without the password hash.
    pub fn to_authenticated(&self) -> Result<AuthenticatedUser, CsError> {
        Ok(AuthenticatedUser {
            user_id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role()?,
        })
    }
}

/// Get user by (normalized) email.
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, CsError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, name, email, password_hash, role, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| CsError::Database(format!("Failed to fetch user by email: {}", e)))?;

    Ok(user)
}

/// Get user by user_id.
pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, CsError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, name, email, password_hash, role, created_at, updated_at
        FROM users
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CsError::Database(format!("Failed to fetch user by id: {}", e)))?;

    Ok(user)
}

/// Check if an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, CsError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE email = $1
        )
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| CsError::Database(format!("Failed to check email existence: {}", e)))?;

    Ok(exists.0)
}

/// Create a new user.
///
/// A concurrent registration that slips past [`email_exists`] hits the
/// unique constraint and is reported as `CsError::Conflict`.
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, CsError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING user_id, name, email, password_hash, role, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("users_email_unique") {
            CsError::Conflict("User already exists".to_string())
        } else {
            CsError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(user)
}
