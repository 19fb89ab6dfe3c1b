//! Repository layer for the complaint service.
//!
//! Free functions taking a `&PgPool`, following the Handler -> Service ->
//! Repository architecture.

pub mod complaints;
pub mod users;

pub use users::User;
