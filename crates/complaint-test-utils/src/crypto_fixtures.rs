//! Deterministic fixtures for testing
//!
//! A fixed JWT secret and a matching service configuration, so tokens minted
//! in tests verify against the server under test.

use base64::{engine::general_purpose, Engine};
use complaint_service::config::{Config, DEFAULT_JWT_CLOCK_SKEW_SECONDS, MIN_BCRYPT_COST};
use common::secret::SecretBox;

/// Fixed 32-byte HS256 secret used by every test server.
pub fn test_jwt_secret() -> Vec<u8> {
    (0u8..32).map(|i| i.wrapping_mul(7).wrapping_add(11)).collect()
}

/// The test secret as the server reads it from `JWT_SECRET`.
pub fn test_jwt_secret_base64() -> String {
    general_purpose::STANDARD.encode(test_jwt_secret())
}

/// Service configuration for tests.
///
/// Uses the minimum bcrypt cost to keep registration fast.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(), // Not used after connection established
        bind_address: "127.0.0.1:0".to_string(),
        jwt_secret: SecretBox::new(Box::new(test_jwt_secret())),
        jwt_clock_skew_seconds: DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        bcrypt_cost: MIN_BCRYPT_COST,
        db_max_connections: 5,
    }
}
