//! Fixed test IDs and credentials for deterministic tests
//!
//! Using fixed values prevents flaky tests caused by random data.

use uuid::Uuid;

// Complaint IDs that never exist in a fresh database
pub const NONEXISTENT_COMPLAINT_ID: Uuid = Uuid::from_u128(1);

// User IDs that never exist in a fresh database
pub const NONEXISTENT_USER_ID: Uuid = Uuid::from_u128(100);

// Test users
pub const ALICE_NAME: &str = "Alice Student";
pub const ALICE_EMAIL: &str = "alice@hostel.test";
pub const BOB_NAME: &str = "Bob Student";
pub const BOB_EMAIL: &str = "bob@hostel.test";
pub const WARDEN_NAME: &str = "Wendy Warden";
pub const WARDEN_EMAIL: &str = "warden@hostel.test";

/// Password shared by every registered test user.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

// Complaint content
pub const TEST_CATEGORY: &str = "Plumbing";
pub const TEST_DESCRIPTION: &str = "Water leaking from the ceiling in room 214";
