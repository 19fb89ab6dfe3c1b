//! Builder patterns for test data construction
//!
//! Provides fluent APIs for creating signed test tokens.

use crate::crypto_fixtures::test_jwt_secret;
use chrono::{Duration, Utc};
use common::jwt::UserClaims;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

/// Builder for creating signed user tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user(user_id)
///     .with_role("admin")
///     .expires_in(-60)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    role: String,
    exp: i64,
    iat: i64,
    secret: Vec<u8>,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults (random user, student, valid for 1 hour)
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Uuid::new_v4().to_string(),
            role: "student".to_string(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
            secret: test_jwt_secret(),
        }
    }

    /// Set the subject user id
    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.sub = user_id.to_string();
        self
    }

    /// Set a raw subject string (for malformed-subject tests)
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set the role claim
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Sign with a different secret (for wrong-key tests)
    pub fn signed_with(mut self, secret: &[u8]) -> Self {
        self.secret = secret.to_vec();
        self
    }

    /// Build the claims without signing
    pub fn claims(&self) -> UserClaims {
        UserClaims {
            sub: self.sub.clone(),
            role: self.role.clone(),
            iat: self.iat,
            exp: self.exp,
        }
    }

    /// Build and sign the token (HS256)
    pub fn build(self) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        encode(
            &header,
            &self.claims(),
            &EncodingKey::from_secret(&self.secret),
        )
        .expect("Test token signing should succeed")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
