//! Metrics definitions for the complaint service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `cs_` prefix for Complaint Service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: ~10 values (parameterized paths)
//! - `status`: 3 values (success, error, timeout)
//! - `operation`: bounded by code (register, login, create, list, ...)
//! - `outcome`: `success` or one of the `ErrorCategory` labels

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Request buckets include the bcrypt-heavy auth endpoints (~200ms at cost 12)
        .set_buckets_for_metric(
            Matcher::Prefix("cs_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `cs_http_requests_total`, `cs_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// This captures ALL HTTP responses including framework-level errors like:
/// - 415 Unsupported Media Type (wrong Content-Type)
/// - 404 Not Found
/// - 405 Method Not Allowed
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("cs_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("cs_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" => "/".to_string(),
        "/ready" => "/ready".to_string(),
        "/metrics" => "/metrics".to_string(),
        "/api/health" => "/api/health".to_string(),
        "/api/auth/register" => "/api/auth/register".to_string(),
        "/api/auth/login" => "/api/auth/login".to_string(),
        "/api/auth/me" => "/api/auth/me".to_string(),
        "/api/complaints" => "/api/complaints".to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Normalize paths with dynamic segments
///
/// Any single segment after `/api/complaints/` becomes `{id}`, whether or not
/// it parses as a UUID, since malformed ids are routed to the same handler.
fn normalize_dynamic_endpoint(path: &str) -> String {
    if path.starts_with("/api/complaints/") {
        let parts: Vec<&str> = path.split('/').collect();

        // /api/complaints/{id} → ["", "api", "complaints", "{id}"]
        if parts.len() == 4 && parts.get(3).is_some_and(|s| !s.is_empty()) {
            return "/api/complaints/{id}".to_string();
        }
    }

    // Unknown paths normalized to "/other" to bound cardinality
    "/other".to_string()
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record an authentication attempt
///
/// Metric: `cs_auth_attempts_total`
/// Labels: `operation` (register, login, authenticate), `outcome`
pub fn record_auth_attempt(operation: &str, outcome: &str) {
    counter!("cs_auth_attempts_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record token validation result
///
/// Metric: `cs_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("cs_token_validations_total",
        "status" => status.to_string(),
        "error_category" => category.to_string()
    )
    .increment(1);
}

// ============================================================================
// Complaint Metrics
// ============================================================================

/// Record a complaint operation
///
/// Metric: `cs_complaint_operations_total`
/// Labels: `operation` (create, list, get, update, delete), `outcome`
pub fn record_complaint_operation(operation: &str, outcome: &str) {
    counter!("cs_complaint_operations_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
