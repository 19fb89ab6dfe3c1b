//! Authentication service: registration, login and caller resolution.

use crate::config::Config;
use crate::crypto;
use crate::errors::CsError;
use crate::models::{
    AuthResponse, AuthenticatedUser, LoginRequest, PublicUser, RegisterRequest, Role,
};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_auth_attempt;
use crate::observability::outcome_label;
use crate::repositories::users;
use common::jwt::UserClaims;
use common::secret::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const MISSING_FIELDS: &str = "Please add all fields";

/// Register a new user and log them in.
///
/// # Steps
///
/// 1. Require name, email and password
/// 2. Validate email format, password length and role
/// 3. Check the email is not taken
/// 4. Hash password (bcrypt, configured cost)
/// 5. Insert user
/// 6. Issue token
///
/// # Errors
///
/// - `Validation` for missing or malformed fields
/// - `Conflict` if the email is already registered
#[instrument(skip_all, name = "cs.service.register")]
pub async fn register(
    pool: &PgPool,
    config: &Config,
    request: RegisterRequest,
) -> Result<AuthResponse, CsError> {
    let result = register_inner(pool, config, request).await;
    record_auth_attempt("register", outcome_label(&result));
    result
}

async fn register_inner(
    pool: &PgPool,
    config: &Config,
    request: RegisterRequest,
) -> Result<AuthResponse, CsError> {
    let name = request.name.as_deref().map(str::trim).unwrap_or_default();
    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    let password = request
        .password
        .as_ref()
        .map(|p| p.expose_secret())
        .unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.trim().is_empty() {
        return Err(CsError::Validation(MISSING_FIELDS.to_string()));
    }

    if !is_valid_email(&email) {
        return Err(CsError::Validation("Invalid email format".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CsError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let role = match request.role.as_deref().map(str::trim) {
        None | Some("") => Role::default(),
        Some(r) => r.parse::<Role>().map_err(CsError::Validation)?,
    };

    if users::email_exists(pool, &email).await? {
        return Err(CsError::Conflict("User already exists".to_string()));
    }

    let password_hash = crypto::hash_password(password, config.bcrypt_cost)?;

    let user = users::create_user(pool, name, &email, &password_hash, role).await?;
    let identity = user.to_authenticated()?;

    tracing::info!(
        target: "cs.service.auth",
        user = %hash_for_correlation(&identity.user_id.to_string()),
        role = identity.role.as_str(),
        "User registered"
    );

    issue_auth_response(config, &identity)
}

/// Verify credentials and issue a token.
///
/// Unknown email and wrong password are indistinguishable to the caller,
/// both in the response and in time spent (a dummy hash is verified when
/// the user does not exist).
#[instrument(skip_all, name = "cs.service.login")]
pub async fn login(
    pool: &PgPool,
    config: &Config,
    request: LoginRequest,
) -> Result<AuthResponse, CsError> {
    let result = login_inner(pool, config, request).await;
    record_auth_attempt("login", outcome_label(&result));
    result
}

async fn login_inner(
    pool: &PgPool,
    config: &Config,
    request: LoginRequest,
) -> Result<AuthResponse, CsError> {
    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    let password: &SecretString = match request.password.as_ref() {
        Some(p) if !email.is_empty() && !p.expose_secret().is_empty() => p,
        _ => return Err(CsError::Validation(MISSING_FIELDS.to_string())),
    };

    let user = users::get_by_email(pool, &email).await?;

    let hash_to_verify = match &user {
        Some(u) => u.password_hash.as_str(),
        None => crypto::DUMMY_PASSWORD_HASH,
    };
    let is_valid = crypto::verify_password(password.expose_secret(), hash_to_verify)
        .unwrap_or(false);

    let user = match user {
        Some(u) if is_valid => u,
        _ => {
            tracing::debug!(target: "cs.service.auth", "Login rejected");
            return Err(CsError::InvalidCredentials);
        }
    };

    let identity = user.to_authenticated()?;
    issue_auth_response(config, &identity)
}

/// Resolve a bearer token to the current caller.
///
/// The role comes from the stored user, not from the token.
///
/// # Errors
///
/// `InvalidToken` if the token fails verification or its user no longer exists.
#[instrument(skip_all, name = "cs.service.authenticate")]
pub async fn authenticate(
    pool: &PgPool,
    config: &Config,
    token: &str,
) -> Result<AuthenticatedUser, CsError> {
    let result = authenticate_inner(pool, config, token).await;
    record_auth_attempt("authenticate", outcome_label(&result));
    result
}

async fn authenticate_inner(
    pool: &PgPool,
    config: &Config,
    token: &str,
) -> Result<AuthenticatedUser, CsError> {
    let claims = crypto::verify_user_token(
        token,
        config.jwt_secret.expose_secret(),
        config.jwt_clock_skew_seconds,
    )?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        CsError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    let user = users::get_by_id(pool, user_id).await?.ok_or_else(|| {
        tracing::debug!(
            target: "cs.service.auth",
            user = %hash_for_correlation(&claims.sub),
            "Token subject no longer exists"
        );
        CsError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    user.to_authenticated()
}

fn issue_auth_response(
    config: &Config,
    identity: &AuthenticatedUser,
) -> Result<AuthResponse, CsError> {
    let claims = UserClaims::issue(
        identity.user_id.to_string(),
        identity.role.as_str().to_string(),
        chrono::Utc::now().timestamp(),
    );
    let token = crypto::sign_user_token(&claims, config.jwt_secret.expose_secret())?;

    Ok(AuthResponse {
        token,
        user: PublicUser::from(identity),
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Simple email validation.
///
/// Checks for basic email format: something@something.something
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    let (local, domain) = match (parts.len(), parts.first(), parts.get(1)) {
        (2, Some(l), Some(d)) => (*l, *d),
        _ => return false,
    };

    if local.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    // Domain must have at least one dot and no empty parts
    let domain_parts: Vec<&str> = domain.split('.').collect();
    domain_parts.len() >= 2 && domain_parts.iter().all(|p| !p.is_empty())
}
