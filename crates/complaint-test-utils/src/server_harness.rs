//! Test server harness for E2E testing
//!
//! Provides TestComplaintServer for spawning real complaint service instances in tests.

use crate::crypto_fixtures::test_config;
use crate::test_ids::TEST_PASSWORD;
use chrono::Utc;
use common::jwt::{UserClaims, USER_TOKEN_LIFETIME};
use common::secret::ExposeSecret;
use complaint_service::config::Config;
use complaint_service::crypto;
use complaint_service::models::{AuthResponse, ComplaintResponse, PublicUser, Role};
use complaint_service::observability::metrics::init_metrics_recorder;
use complaint_service::routes::{self, AppState};
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A registered user and the token returned at registration.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub token: String,
    pub user: PublicUser,
}

impl TestUser {
    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test harness for spawning the complaint service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[sqlx::test(migrations = "../../migrations")]
/// async fn test_create_complaint_e2e(pool: PgPool) -> Result<()> {
///     let server = TestComplaintServer::spawn(pool).await?;
///     let alice = server.register_user(ALICE_NAME, ALICE_EMAIL, None).await?;
///
///     let response = server
///         .client()
///         .post(format!("{}/api/complaints", server.url()))
///         .header("Authorization", alice.bearer())
///         .json(&json!({"category": "Plumbing", "description": "Leak"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 201);
///     Ok(())
/// }
/// ```
pub struct TestComplaintServer {
    addr: SocketAddr,
    pool: PgPool,
    config: Config,
    client: reqwest::Client,
    _handle: JoinHandle<()>,
}

impl TestComplaintServer {
    /// Spawn a new test server instance with isolated database
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Sign tokens with the fixed test secret
    /// - Start the HTTP server in the background
    ///
    /// # Arguments
    /// * `pool` - Database connection pool (typically from `#[sqlx::test]`)
    pub async fn spawn(pool: PgPool) -> Result<Self, anyhow::Error> {
        let config = test_config();

        let state = Arc::new(AppState {
            pool: pool.clone(),
            config: config.clone(),
        });

        // The global recorder can only be installed once per test process.
        // Later servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            client: reqwest::Client::new(),
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address of the test server
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the configuration the server was started with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Register a user through the API with [`TEST_PASSWORD`].
    ///
    /// `role` of `None` leaves the role out of the request body.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        role: Option<Role>,
    ) -> Result<TestUser, anyhow::Error> {
        let mut body = json!({
            "name": name,
            "email": email,
            "password": TEST_PASSWORD,
        });
        if let Some(role) = role {
            body["role"] = json!(role.as_str());
        }

        let response = self
            .client
            .post(format!("{}/api/auth/register", self.url()))
            .json(&body)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::CREATED {
            anyhow::bail!(
                "Registration of {} failed with {}: {}",
                email,
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }

        let auth: AuthResponse = response.json().await?;
        Ok(TestUser {
            token: auth.token,
            user: auth.user,
        })
    }

    /// Log in through the API, returning the raw response.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.url()))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        Ok(response)
    }

    /// Create a complaint through the API as `user`.
    pub async fn create_complaint(
        &self,
        user: &TestUser,
        category: &str,
        description: &str,
        priority: Option<&str>,
    ) -> Result<ComplaintResponse, anyhow::Error> {
        let mut body = json!({
            "category": category,
            "description": description,
        });
        if let Some(priority) = priority {
            body["priority"] = json!(priority);
        }

        let response = self
            .client
            .post(format!("{}/api/complaints", self.url()))
            .header("Authorization", user.bearer())
            .json(&body)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::CREATED {
            anyhow::bail!(
                "Complaint creation failed with {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }

        Ok(response.json().await?)
    }

    /// Sign a token for `user_id` with the server's secret.
    pub fn token_for(&self, user_id: Uuid, role: Role, iat: i64) -> Result<String, anyhow::Error> {
        let lifetime = i64::try_from(USER_TOKEN_LIFETIME.as_secs())?;
        let claims = UserClaims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iat,
            exp: iat + lifetime,
        };

        crypto::sign_user_token(&claims, self.config.jwt_secret.expose_secret())
            .map_err(|e| anyhow::anyhow!("Failed to sign test token: {}", e))
    }

    /// Sign a token for `user_id` that expired an hour ago.
    pub fn create_expired_token(&self, user_id: Uuid) -> Result<String, anyhow::Error> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user_id.to_string(),
            role: Role::Student.as_str().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };

        crypto::sign_user_token(&claims, self.config.jwt_secret.expose_secret())
            .map_err(|e| anyhow::anyhow!("Failed to sign test token: {}", e))
    }
}

impl Drop for TestComplaintServer {
    fn drop(&mut self) {
        // Abort the server task when the test server is dropped
        self._handle.abort();
    }
}
