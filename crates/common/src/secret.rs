//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports [`secrecy`] types. Passwords in request bodies and the token
//! signing secret are held in these wrappers so that `{:?}` and tracing
//! output only ever show `[REDACTED]`.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct LoginRequest {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let req = LoginRequest {
//!     email: "alice@hostel.edu".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // Safe: the password is redacted
//! println!("{:?}", req);
//!
//! let password: &str = req.password.expose_secret();
//! ```
//!
//! Use `SecretString` for user passwords and bearer tokens, and
//! `SecretBox<Vec<u8>>` for binary key material such as the JWT secret.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
