//! Business logic layer for the complaint service.

pub mod auth_service;
pub mod complaint_service;
