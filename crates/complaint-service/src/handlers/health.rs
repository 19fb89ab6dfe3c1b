//! Health check handlers.
//!
//! - `/api/health`: liveness, consumed by the web client
//! - `/ready`: readiness, checks database connectivity

use crate::models::{HealthResponse, ReadinessResponse};
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

/// Liveness handler for GET /api/health.
///
/// Does not check dependencies.
pub async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "success",
        message: "Server is healthy",
        timestamp: chrono::Utc::now(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 if the database answers a trivial query, 503 otherwise.
/// The actual error is logged server-side only.
#[tracing::instrument(skip_all, name = "cs.health.readiness")]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    if let Err(e) = sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        tracing::warn!("Readiness check failed: database error: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("unhealthy"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            error: None,
        }),
    )
}
