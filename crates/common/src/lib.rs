//! Common utilities and types shared across the complaint tracker crates.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for JWT utilities (claims, size limits, clock skew)
pub mod jwt;
