//! Complaint Service Library
//!
//! Backend for the hostel complaint tracker: students file complaints,
//! admins triage and resolve them.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing and token signing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and HTTP metrics
//! - `models` - Domain, request and response types
//! - `observability` - Log correlation and metrics
//! - `policy` - Authorization rules for complaints
//! - `repositories` - Database access layer
//! - `routes` - Router and application state
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod services;
