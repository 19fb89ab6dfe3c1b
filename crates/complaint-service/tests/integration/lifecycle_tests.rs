//! End-to-end complaint lifecycle scenarios across student and admin users.

use complaint_service::models::{ComplaintStatus, Role};
use complaint_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;

/// Student files a complaint, the warden resolves it, and the student can no
/// longer delete it.
#[sqlx::test(migrations = "../../migrations")]
async fn test_resolved_complaint_cannot_be_deleted_by_owner(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;

    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;
    assert_eq!(complaint.status, ComplaintStatus::Pending);
    let url = format!("{}/api/complaints/{}", server.url(), complaint.id);

    // Warden sees it
    let listed: Vec<serde_json::Value> = server
        .client()
        .get(format!("{}/api/complaints", server.url()))
        .header("Authorization", warden.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert!(listed
        .iter()
        .any(|c| c["id"] == complaint.id.to_string()));

    // Warden resolves it
    let response = server
        .client()
        .patch(&url)
        .header("Authorization", warden.bearer())
        .json(&json!({"status": "Resolved"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Owner delete now fails on state
    let response = server
        .client()
        .delete(&url)
        .header("Authorization", alice.bearer())
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("INVALID_STATE");

    // And the complaint is still there
    let response = server
        .client()
        .get(&url)
        .header("Authorization", alice.bearer())
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "Resolved");

    Ok(())
}

/// Owner deletes a Pending complaint; it disappears and a second delete is 404.
#[sqlx::test(migrations = "../../migrations")]
async fn test_owner_deletes_pending_complaint(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, Some("High"))
        .await?;
    let url = format!("{}/api/complaints/{}", server.url(), complaint.id);

    let response = server
        .client()
        .delete(&url)
        .header("Authorization", alice.bearer())
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["id"], complaint.id.to_string());

    let listed: Vec<serde_json::Value> = server
        .client()
        .get(format!("{}/api/complaints", server.url()))
        .header("Authorization", alice.bearer())
        .send()
        .await?
        .json()
        .await?;
    assert!(listed.is_empty());

    let stored: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM complaints WHERE complaint_id = $1")
            .bind(complaint.id)
            .fetch_one(server.pool())
            .await?;
    assert_eq!(stored, 0);

    let response = server
        .client()
        .delete(&url)
        .header("Authorization", alice.bearer())
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("NOT_FOUND");

    Ok(())
}
