use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::CsError;
use crate::observability::metrics::record_token_validation;
use common::jwt::{self, UserClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tracing::instrument;

/// Well-formed bcrypt hash of a random value, verified against when the
/// requested user does not exist so both login failure paths cost the same.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `CsError::Crypto` if:
/// - Cost is outside the accepted range (10-14)
/// - Bcrypt hashing fails
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, CsError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(CsError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| CsError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CsError> {
    bcrypt::verify(password, hash)
        .map_err(|e| CsError::Crypto(format!("Password verification failed: {}", e)))
}

/// Sign user claims as an HS256 JWT.
#[instrument(skip_all)]
pub fn sign_user_token(claims: &UserClaims, secret: &[u8]) -> Result<String, CsError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| CsError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify a user JWT and extract claims.
///
/// Validates:
/// - Token size and shape (before any decoding)
/// - Signature (HS256)
/// - Expiration (`exp` claim, no leeway)
/// - Issued-at time (`iat` claim) with clock skew tolerance
#[instrument(skip_all)]
pub fn verify_user_token(
    token: &str,
    secret: &[u8],
    clock_skew_seconds: i64,
) -> Result<UserClaims, CsError> {
    jwt::check_token_shape(token).map_err(|e| {
        record_token_validation("error", Some("malformed"));
        CsError::InvalidToken(e.to_string())
    })?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<UserClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            tracing::debug!(target: "cs.crypto", error = %e, "User token verification failed");
            let category = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => "expired",
                jsonwebtoken::errors::ErrorKind::InvalidSignature => "signature",
                _ => "malformed",
            };
            record_token_validation("error", Some(category));
            CsError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
        })?;

    let skew = Duration::from_secs(clock_skew_seconds.max(0).unsigned_abs());
    jwt::validate_iat(token_data.claims.iat, skew).map_err(|e| {
        record_token_validation("error", Some("clock_skew"));
        CsError::InvalidToken(e.to_string())
    })?;

    record_token_validation("success", None);
    Ok(token_data.claims)
}
