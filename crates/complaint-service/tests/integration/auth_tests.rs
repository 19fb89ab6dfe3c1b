//! E2E tests for registration, login and token handling.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use complaint_service::models::Role;
use complaint_test_utils::*;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::PgPool;

// ============================================================================
// Registration
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_happy_path_returns_token_and_user(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/register", server.url()))
        .json(&json!({
            "name": ALICE_NAME,
            "email": ALICE_EMAIL,
            "password": TEST_PASSWORD
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await?;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap();

    token
        .assert_valid_jwt()
        .assert_for_subject(user_id)
        .assert_role("student")
        .assert_expires_in(7 * 24 * 60 * 60);

    assert_eq!(body["user"]["name"], ALICE_NAME);
    assert_eq!(body["user"]["email"], ALICE_EMAIL);
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_admin_role(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let warden = server
        .register_user(WARDEN_NAME, WARDEN_EMAIL, Some(Role::Admin))
        .await?;

    assert_eq!(warden.user.role, Role::Admin);
    warden.token.assert_role("admin");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_duplicate_email_returns_conflict(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    // Same address with different case and padding
    let response = server
        .client()
        .post(format!("{}/api/auth/register", server.url()))
        .json(&json!({
            "name": "Another Alice",
            "email": "  ALICE@hostel.test ",
            "password": TEST_PASSWORD
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    body.assert_error_code("CONFLICT")
        .assert_message_contains("already exists");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_missing_fields_returns_validation_error(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let bodies = [
        json!({"email": ALICE_EMAIL, "password": TEST_PASSWORD}),
        json!({"name": ALICE_NAME, "password": TEST_PASSWORD}),
        json!({"name": ALICE_NAME, "email": ALICE_EMAIL}),
        json!({"name": "   ", "email": ALICE_EMAIL, "password": TEST_PASSWORD}),
    ];

    for body in bodies {
        let response = server
            .client()
            .post(format!("{}/api/auth/register", server.url()))
            .json(&body)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let err: serde_json::Value = response.json().await?;
        err.assert_error_code("VALIDATION_ERROR")
            .assert_message_contains("Please add all fields");
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_invalid_inputs_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let bodies = [
        json!({"name": ALICE_NAME, "email": "not-an-email", "password": TEST_PASSWORD}),
        json!({"name": ALICE_NAME, "email": ALICE_EMAIL, "password": "short"}),
        json!({
            "name": ALICE_NAME,
            "email": ALICE_EMAIL,
            "password": TEST_PASSWORD,
            "role": "superuser"
        }),
    ];

    for body in bodies {
        let response = server
            .client()
            .post(format!("{}/api/auth/register", server.url()))
            .json(&body)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let err: serde_json::Value = response.json().await?;
        err.assert_error_code("VALIDATION_ERROR");
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_register_malformed_json_returns_400(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/register", server.url()))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("VALIDATION_ERROR");

    Ok(())
}

// ============================================================================
// Login
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_happy_path(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let response = server.login(ALICE_EMAIL, TEST_PASSWORD).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    body["token"]
        .as_str()
        .unwrap()
        .to_string()
        .assert_valid_jwt()
        .assert_for_subject(&alice.user.id.to_string());
    assert_eq!(body["user"]["id"], alice.user.id.to_string());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_wrong_password_and_unknown_email_look_the_same(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let wrong_password = server.login(ALICE_EMAIL, "not-the-password").await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: serde_json::Value = wrong_password.json().await?;

    let unknown_email = server.login("nobody@hostel.test", TEST_PASSWORD).await?;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: serde_json::Value = unknown_email.json().await?;

    wrong_password.assert_error_code("INVALID_CREDENTIALS");
    assert_eq!(wrong_password, unknown_email);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_login_missing_fields_returns_400(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"email": ALICE_EMAIL}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("VALIDATION_ERROR");

    Ok(())
}

// ============================================================================
// Token handling
// ============================================================================

#[sqlx::test(migrations = "../../migrations")]
async fn test_me_returns_caller(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let response = server
        .client()
        .get(format!("{}/api/auth/me", server.url()))
        .header("Authorization", alice.bearer())
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["id"], alice.user.id.to_string());
    assert_eq!(body["email"], ALICE_EMAIL);
    assert_eq!(body["role"], "student");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_protected_route_without_token_returns_401(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;

    let response = server
        .client()
        .get(format!("{}/api/complaints", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let err: serde_json::Value = response.json().await?;
    err.assert_error_code("INVALID_TOKEN")
        .assert_message_contains("no token");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rejected_tokens_return_401(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let future_iat = chrono::Utc::now().timestamp() + 3600;
    let tokens = [
        server.create_expired_token(alice.user.id)?,
        server.token_for(alice.user.id, Role::Student, future_iat)?,
        TestTokenBuilder::new()
            .for_user(alice.user.id)
            .issued_at(future_iat)
            .expires_in(7200)
            .build(),
        TestTokenBuilder::new()
            .for_user(alice.user.id)
            .signed_with(&[9u8; 32])
            .build(),
        TestTokenBuilder::new().with_subject("not-a-uuid").build(),
        TestTokenBuilder::new().for_user(NONEXISTENT_USER_ID).build(),
        "garbage".to_string(),
    ];

    for token in tokens {
        let response = server
            .client()
            .get(format!("{}/api/auth/me", server.url()))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token: {}", token);
        let err: serde_json::Value = response.json().await?;
        err.assert_error_code("INVALID_TOKEN");
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_iat_within_clock_skew_is_accepted(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;

    let skew = server.config().jwt_clock_skew_seconds;
    let now = chrono::Utc::now().timestamp();

    for (iat, expected) in [
        (now + skew - 60, StatusCode::OK),
        (now + skew + 60, StatusCode::UNAUTHORIZED),
    ] {
        let token = TestTokenBuilder::new()
            .for_user(alice.user.id)
            .issued_at(iat)
            .expires_in(3600)
            .build();

        let response = server
            .client()
            .get(format!("{}/api/auth/me", server.url()))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        assert_eq!(response.status(), expected, "iat offset {}", iat - now);
    }

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_role_comes_from_stored_user_not_token(pool: PgPool) -> Result<(), anyhow::Error> {
    let server = TestComplaintServer::spawn(pool).await?;
    let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
    let bob = server.register_user(BOB_NAME, BOB_EMAIL, None).await?;
    server
        .create_complaint(&bob, TEST_CATEGORY, TEST_DESCRIPTION, None)
        .await?;

    // A student token that claims admin still lists only the student's own complaints
    let forged = TestTokenBuilder::new()
        .for_user(alice.user.id)
        .with_role("admin")
        .build();

    let response = server
        .client()
        .get(format!("{}/api/complaints", server.url()))
        .header("Authorization", format!("Bearer {}", forged))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Vec<serde_json::Value> = response.json().await?;
    assert!(body.is_empty());

    Ok(())
}
