//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for tokens and JSON error bodies.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

fn decode_part<T: for<'de> Deserialize<'de>>(token: &str, index: usize) -> T {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing part {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT part {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT part {} JSON: {}", index, e))
}

/// Custom assertions for tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_role("admin")
///     .assert_expires_in(7 * 24 * 60 * 60);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is an HS256 JWT with user claims
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert the role claim
    fn assert_role(&self, role: &str) -> &Self;

    /// Assert that the token expires within the specified seconds (5s tolerance)
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header: JwtHeader = decode_part(self, 0);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims: JwtClaims = decode_part(self, 1);
        assert!(claims.exp > claims.iat, "exp must be after iat");

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims: JwtClaims = decode_part(self, 1);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );
        self
    }

    fn assert_role(&self, role: &str) -> &Self {
        let claims: JwtClaims = decode_part(self, 1);
        assert_eq!(
            claims.role, role,
            "Expected role '{}', got '{}'",
            role, claims.role
        );
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims: JwtClaims = decode_part(self, 1);
        let expires_in = claims.exp - chrono::Utc::now().timestamp();

        assert!(
            (expires_in - seconds).abs() <= 5,
            "Expected token to expire in {} seconds, but expires in {} seconds",
            seconds,
            expires_in
        );
        self
    }
}

/// Assertions on the `{"error": {"code", "message"}}` response body
pub trait ErrorBodyAssertions {
    /// Assert the error code
    fn assert_error_code(&self, code: &str) -> &Self;

    /// Assert the error message contains `fragment`
    fn assert_message_contains(&self, fragment: &str) -> &Self;
}

impl ErrorBodyAssertions for serde_json::Value {
    fn assert_error_code(&self, code: &str) -> &Self {
        assert_eq!(
            self["error"]["code"].as_str(),
            Some(code),
            "Expected error code '{}' in body {}",
            code,
            self
        );
        self
    }

    fn assert_message_contains(&self, fragment: &str) -> &Self {
        let message = self["error"]["message"].as_str().unwrap_or_default();
        assert!(
            message.contains(fragment),
            "Expected error message to contain '{}', got '{}'",
            fragment,
            message
        );
        self
    }
}
