//! E2E tests for complaint CRUD and role-scoped access.

use complaint_service::models::Role;
use complaint_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;

async fn patch(
    server: &TestComplaintServer,
    user: &TestUser,
    id: &str,
    body: serde_json::Value,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .patch(format!("{}/api/complaints/{}", server.url(), id))
        .header("Authorization", user.bearer())
        .json(&body)
        .send()
        .await?)
}

async fn delete(
    server: &TestComplaintServer,
    user: &TestUser,
    id: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .delete(format!("{}/api/complaints/{}", server.url(), id))
        .header("Authorization", user.bearer())
        .send()
        .await?)
}

async fn list(
    server: &TestComplaintServer,
    user: &TestUser,
) -> Result<Vec<serde_json::Value>, anyhow::Error> {
    let response = server
        .client()
        .get(format!("{}/api/complaints?t=1700000000000", server.url()))
        .header("Authorization", user.bearer())
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(response.json().await?)
}

// ============================================================================
// Create
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_complaint_defaults_and_owner(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let bob = server.register_user(BOB_NAME, BOB_EMAIL, None).await?;

    // A client-supplied owner is ignored
    let response = server
        .client()
        .post(format!("{}/api/complaints", server.url()))
        .header("Authorization", alice.bearer())
        .json(&json!({
            "category": TEST_CATEGORY,
            "description": TEST_DESCRIPTION,
            "user": bob.user.id,
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["priority"], "Medium");
    assert_eq!(body["category"], TEST_CATEGORY);
    assert_eq!(body["description"], TEST_DESCRIPTION);
    assert_eq!(body["owner"]["id"], alice.user.id.to_string());
    assert_eq!(body["owner"]["name"], ALICE_NAME);
    assert_eq!(body["owner"]["email"], ALICE_EMAIL);
    assert!(body["created_at"].is_string());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_complaint_validation(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let bodies = [
        json!({"description": TEST_DESCRIPTION}),
        json!({"category": TEST_CATEGORY}),
        json!({"category": "", "description": TEST_DESCRIPTION}),
        json!({"category": TEST_CATEGORY, "description": TEST_DESCRIPTION, "priority": "Urgent"}),
    ];

    for body in bodies {
        let response = server
            .client()
            .post(format!("{}/api/complaints", server.url()))
            .header("Authorization", alice.bearer())
            .json(&body)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let err: serde_json::Value = response.json().await?;
        err.assert_error_code("VALIDATION_ERROR");
    }

    assert!(list(&server, &alice).await?.is_empty());

    Ok(())
}

// ============================================================================
// Read
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_is_scoped_by_role_and_newest_first(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let bob = server.register_user(BOB_NAME, BOB_EMAIL, None).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;

    let first = server
        .create_complaint(&alice, "Plumbing", "Leak", None)
        .await?;
    let second = server
        .create_complaint(&bob, "Electrical", "Flickering light", Some("High"))
        .await?;
    let third = server
        .create_complaint(&alice, "Furniture", "Broken chair", Some("Low"))
        .await?;

    let alice_ids: Vec<_> = list(&server, &alice)
        .await?
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(alice_ids, vec![third.id.to_string(), first.id.to_string()]);

    let bob_ids: Vec<_> = list(&server, &bob)
        .await?
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(bob_ids, vec![second.id.to_string()]);

    let all_ids: Vec<_> = list(&server, &warden)
        .await?
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        all_ids,
        vec![
            third.id.to_string(),
            second.id.to_string(),
            first.id.to_string()
        ]
    );

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_single_complaint_access(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let bob = server.register_user(BOB_NAME, BOB_EMAIL, None).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;
    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;
    let url = format!("{}/api/complaints/{}", server.url(), complaint.id);

    for (user, expected) in [
        (&alice, StatusCode::OK),
        (&warden, StatusCode::OK),
        (&bob, StatusCode::FORBIDDEN),
    ] {
        let response = server
            .client()
            .get(&url)
            .header("Authorization", user.bearer())
            .send()
            .await?;
        assert_eq!(response.status(), expected, "caller {}", user.user.email);
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_and_malformed_ids_return_404(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;

    for id in [NONEXISTENT_COMPLAINT_ID.to_string(), "not-a-uuid".to_string()] {
        let response = server
            .client()
            .get(format!("{}/api/complaints/{}", server.url(), id))
            .header("Authorization", warden.bearer())
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "id {}", id);

        let response = patch(&server, &warden, &id, json!({"status": "Resolved"})).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "id {}", id);

        let response = delete(&server, &warden, &id).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "id {}", id);
        let err: serde_json::Value = response.json().await?;
        err.assert_error_code("NOT_FOUND");
    }

    Ok(())
}

// ============================================================================
// Update
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_sets_any_status(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;
    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;
    let id = complaint.id.to_string();

    for status in ["Resolved", "Pending", "In Progress", "In Progress"] {
        let response = patch(&server, &warden, &id, json!({"status": status})).await?;
        assert_eq!(response.status(), StatusCode::OK, "status {}", status);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["status"], status);
        assert_eq!(body["owner"]["id"], alice.user.id.to_string());
    }

    let response = patch(&server, &warden, &id, json!({"status": "Closed"})).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("VALIDATION_ERROR");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_student_cannot_change_status(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;

    let response = patch(
        &server,
        &alice,
        &complaint.id.to_string(),
        json!({"status": "Resolved"}),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("FORBIDDEN");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_owner_edits_content_while_pending(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;

    let response = patch(
        &server,
        &alice,
        &complaint.id.to_string(),
        json!({"description": "Leak is getting worse", "priority": "High"}),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["description"], "Leak is getting worse");
    assert_eq!(body["priority"], "High");
    assert_eq!(body["category"], TEST_CATEGORY);
    assert_eq!(body["status"], "Pending");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_content_edit_rules(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let bob = server.register_user(BOB_NAME, BOB_EMAIL, None).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;
    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;
    let id = complaint.id.to_string();

    // Another student
    let response = patch(&server, &bob, &id, json!({"category": "Other"})).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins never edit other users' content
    let response = patch(&server, &warden, &id, json!({"category": "Other"})).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Empty patch
    let response = patch(&server, &alice, &id, json!({})).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("VALIDATION_ERROR");

    // Owner after the complaint left Pending
    let response = patch(&server, &warden, &id, json!({"status": "In Progress"})).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch(&server, &alice, &id, json!({"category": "Other"})).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("INVALID_STATE");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_admin_edits_own_pending_complaint(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;
    let complaint = server
        .create_complaint(&warden, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;

    let response = patch(
        &server,
        &warden,
        &complaint.id.to_string(),
        json!({"category": "Security", "status": "Resolved"}),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["category"], "Security");
    assert_eq!(body["status"], "Resolved");

    Ok(())
}

// ============================================================================
// Delete
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_permissions(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let bob = server.register_user(BOB_NAME, BOB_EMAIL, None).await?;
    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;

    let complaint = server
        .create_complaint(&alice, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;
    let id = complaint.id.to_string();

    let response = delete(&server, &bob, &id).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin deletes regardless of status
    let response = patch(&server, &warden, &id, json!({"status": "Resolved"})).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete(&server, &warden, &id).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["id"], id);

    assert!(list(&server, &warden).await?.is_empty());

    Ok(())
}
