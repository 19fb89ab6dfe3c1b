use crate::errors::CsError;
use chrono::{DateTime, Utc};
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Complaint priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            _ => Err(format!(
                "Invalid priority: '{}'. Must be one of: Low, Medium, High",
                s
            )),
        }
    }
}

/// Complaint status.
///
/// `Pending` is the initial state. Admins may move a complaint to any status;
/// owners may only edit or delete while it is `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    /// Whether the owner may still edit content or delete the complaint.
    pub fn is_owner_mutable(&self) -> bool {
        matches!(self, ComplaintStatus::Pending)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ComplaintStatus::Pending),
            "In Progress" => Ok(ComplaintStatus::InProgress),
            "Resolved" => Ok(ComplaintStatus::Resolved),
            _ => Err(format!(
                "Invalid status: '{}'. Must be one of: Pending, In Progress, Resolved",
                s
            )),
        }
    }
}

// ============================================================================
// Domain types
// ============================================================================

/// Caller identity resolved by the auth middleware.
///
/// Inserted into request extensions and handed to services explicitly.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Complaint joined with its owner's public fields.
#[derive(Debug, Clone)]
pub struct Complaint {
    pub complaint_id: Uuid,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub owner_email: String,
    pub category: String,
    pub description: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub category: String,
    pub description: String,
    pub priority: Priority,
}

/// Validated content changes requested by an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChanges {
    pub category: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

impl ContentChanges {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.description.is_none() && self.priority.is_none()
    }
}

/// Validated PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintPatch {
    pub status: Option<ComplaintStatus>,
    pub content: ContentChanges,
}

// ============================================================================
// Requests
// ============================================================================

/// POST /api/auth/register
///
/// Fields are optional at the serde level so that a missing field yields a
/// validation error with a readable message.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub role: Option<String>,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

/// POST /api/complaints
///
/// Any owner id sent by the client is ignored; the owner is the caller.
#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    pub category: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

impl CreateComplaintRequest {
    pub fn validate(self) -> Result<NewComplaint, CsError> {
        let category = required_text(self.category, "category")?;
        let description = required_text(self.description, "description")?;
        let priority = match self.priority {
            Some(p) => p.parse::<Priority>().map_err(CsError::Validation)?,
            None => Priority::default(),
        };

        Ok(NewComplaint {
            category,
            description,
            priority,
        })
    }
}

/// PATCH /api/complaints/:id
#[derive(Debug, Default, Deserialize)]
pub struct UpdateComplaintRequest {
    pub status: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

impl UpdateComplaintRequest {
    pub fn validate(self) -> Result<ComplaintPatch, CsError> {
        let status = self
            .status
            .map(|s| s.parse::<ComplaintStatus>().map_err(CsError::Validation))
            .transpose()?;

        let category = self
            .category
            .map(|c| required_text(Some(c), "category"))
            .transpose()?;
        let description = self
            .description
            .map(|d| required_text(Some(d), "description"))
            .transpose()?;
        let priority = self
            .priority
            .map(|p| p.parse::<Priority>().map_err(CsError::Validation))
            .transpose()?;

        let patch = ComplaintPatch {
            status,
            content: ContentChanges {
                category,
                description,
                priority,
            },
        };

        if patch.status.is_none() && patch.content.is_empty() {
            return Err(CsError::Validation(
                "Provide at least one of: status, category, description, priority".to_string(),
            ));
        }

        Ok(patch)
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, CsError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CsError::Validation(format!("Please add a {}", field))),
    }
}

// ============================================================================
// Responses
// ============================================================================

/// User fields safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&AuthenticatedUser> for PublicUser {
    fn from(user: &AuthenticatedUser) -> Self {
        PublicUser {
            id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Token plus public user, returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub owner: ComplaintOwner,
    pub category: String,
    pub description: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Complaint> for ComplaintResponse {
    fn from(c: Complaint) -> Self {
        ComplaintResponse {
            id: c.complaint_id,
            owner: ComplaintOwner {
                id: c.owner_id,
                name: c.owner_name,
                email: c.owner_email,
            },
            category: c.category,
            description: c.description,
            priority: c.priority,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteComplaintResponse {
    pub id: Uuid,
}

/// GET /api/health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /ready
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
