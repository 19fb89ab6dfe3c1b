//! Observability for the complaint service.
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field allow-listing.
//! Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (enums, operation names, complaint ids)
//! - **HASHED**: Must be SHA-256 hashed for correlation (user ids, emails)
//! - **NEVER**: Must never appear in logs (passwords, tokens, secrets)

pub mod metrics;

use crate::errors::CsError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for fields like `user_id` that need correlation across log entries
/// but should not be stored in plaintext.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // First 4 bytes = 8 hex chars
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or malformed input, duplicate email
    Validation,
    /// Bad credentials or token
    Authentication,
    /// Role or ownership violation
    Authorization,
    /// Missing complaint or user
    NotFound,
    /// Complaint no longer Pending
    State,
    /// Database, crypto or other internal failure
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::State => "state",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&CsError> for ErrorCategory {
    fn from(err: &CsError) -> Self {
        match err {
            CsError::Validation(_) | CsError::Conflict(_) => ErrorCategory::Validation,
            CsError::InvalidCredentials | CsError::InvalidToken(_) => {
                ErrorCategory::Authentication
            }
            CsError::Forbidden(_) => ErrorCategory::Authorization,
            CsError::NotFound(_) => ErrorCategory::NotFound,
            CsError::InvalidState(_) => ErrorCategory::State,
            CsError::Database(_) | CsError::Crypto(_) | CsError::Internal => {
                ErrorCategory::Internal
            }
        }
    }
}

/// Outcome label for an operation result: `success` or the error category.
pub fn outcome_label<T>(result: &Result<T, CsError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => ErrorCategory::from(e).as_str(),
    }
}
