//! # Complaint Test Utilities
//!
//! Shared test utilities for the complaint service.
//!
//! This crate provides:
//! - Deterministic fixtures (fixed JWT secret, test configuration)
//! - Test data builders (TestTokenBuilder)
//! - Server test harness (TestComplaintServer for E2E tests)
//! - Fixed test IDs and credentials
//! - Custom assertions (TokenAssertions, ErrorBodyAssertions)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use complaint_test_utils::*;
//!
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_example(pool: PgPool) -> anyhow::Result<()> {
//!     let server = TestComplaintServer::spawn(pool).await?;
//!     let student = server.register_user("Alice", ALICE_EMAIL, None).await?;
//!
//!     student.token.assert_valid_jwt().assert_for_subject(&student.user.id.to_string());
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
