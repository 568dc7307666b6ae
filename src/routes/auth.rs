/**
 * Authentication Routes
 * bcrypt credentials, JWT bearer tokens, password reset and admin user management
 */
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{AdminUserRow, PasswordResetRow};
use crate::error::ApiError;
use crate::mailer::OutgoingMail;
use crate::models::AdminUser;
use crate::routes::{require_pool, required, respond, validate_email};
use crate::state::AppState;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

lazy_static::lazy_static! {
    /// JWT secret key from environment
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

    /// Access token lifetime
    static ref TOKEN_EXPIRY_HOURS: i64 = std::env::var("JWT_EXPIRY_HOURS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(24);

    /// Admin email used when no database is configured
    pub static ref ADMIN_EMAIL: String = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_string());

    /// Admin password hash used when no database is configured
    pub static ref ADMIN_PASSWORD_HASH: String = {
        if let Ok(hash) = std::env::var("ADMIN_HASH_PASSWORD") {
            hash
        } else if let Ok(plain) = std::env::var("ADMIN_PASSWORD") {
            hash(&plain, DEFAULT_COST).unwrap_or_default()
        } else {
            hash("admin123", DEFAULT_COST).unwrap_or_default()
        }
    };

    /// Login attempts per IP within the current window
    static ref LOGIN_ATTEMPTS: Arc<RwLock<HashMap<String, (i64, u32)>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

const MIN_PASSWORD_LEN: usize = 8;
const RESET_TOKEN_EXPIRY_MINUTES: i64 = 60;
const RATE_LIMIT_WINDOW_SECS: i64 = 60;
const MAX_LOGIN_ATTEMPTS: u32 = 5;

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user: AdminUser,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn generate_reset_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 48)
}

/// SHA-256 of a reset token; only the hash is stored.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a bearer token for an admin.
pub fn issue_token(user: &AdminUser) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(*TOKEN_EXPIRY_HOURS);

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        username: user.username.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Verify and decode access token
pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Gate for protected handlers. Every admin has full access.
pub fn require_admin(headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Authorization required".to_string()))?;
    verify_access_token(token).map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })
}

/// bcrypt is CPU-bound; keep it off the async executor.
async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
        .await
        .map_err(|e| ApiError::Internal(format!("hash task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

async fn password_matches(password: String, password_hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&password, &password_hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Sliding-window login limiter keyed by IP.
///
/// Stale entries are evicted on every write so the map stays proportional to
/// active clients.
async fn check_rate_limit(ip: &str) -> bool {
    #[cfg(test)]
    {
        let _ = ip;
        true
    }

    #[cfg(not(test))]
    {
        let now = Utc::now().timestamp();
        let mut attempts = LOGIN_ATTEMPTS.write().await;
        attempts.retain(|_, (start, _)| now - *start < RATE_LIMIT_WINDOW_SECS);

        let entry = attempts.entry(ip.to_string()).or_insert((now, 0));
        entry.1 += 1;
        entry.1 <= MAX_LOGIN_ATTEMPTS
    }
}

async fn insert_admin(payload: &RegisterRequest) -> Result<AdminUser, ApiError> {
    required("Username", &payload.username)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let pool = require_pool()?;
    let password_hash = hash_password(payload.password.clone()).await?;

    sqlx::query_as::<_, AdminUser>(
        r#"
        INSERT INTO admin_users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, created_at
        "#,
    )
    .bind(payload.username.trim())
    .bind(payload.email.trim())
    .bind(&password_hash)
    .fetch_one(pool.as_ref())
    .await
    .map_err(|e| {
        if crate::db::is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".to_string())
        } else {
            ApiError::Database(e)
        }
    })
}

async fn find_admin_by_email(email: &str) -> Result<Option<AdminUserRow>, ApiError> {
    let pool = require_pool()?;
    Ok(sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, username, email, password_hash, created_at \
         FROM admin_users WHERE LOWER(email) = LOWER($1)",
    )
    .bind(email.trim())
    .fetch_optional(pool.as_ref())
    .await?)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
/// Creates the first admin; closed once any admin exists.
pub async fn register(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if !check_rate_limit(&addr.ip().to_string()).await {
        return Err(ApiError::TooManyRequests);
    }

    let pool = require_pool()?;
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool.as_ref())
        .await?;
    if existing > 0 {
        return Err(ApiError::Forbidden(
            "Registration is closed. An admin account already exists.".to_string(),
        ));
    }

    let user = insert_admin(&payload).await?;
    tracing::info!("Admin user registered: {}", user.email);
    Ok(respond(StatusCode::CREATED, "Admin registered", user))
}

/// POST /api/auth/login
pub async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if !check_rate_limit(&addr.ip().to_string()).await {
        return Err(ApiError::TooManyRequests);
    }

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    validate_email(&payload.email)?;

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    // Without a database, fall back to env-var credentials (local dev).
    let user = if crate::db::get_pool().is_some() {
        let row = find_admin_by_email(&payload.email).await?.ok_or_else(|| {
            tracing::warn!("Login attempt for unknown user: {}", payload.email);
            invalid()
        })?;
        if !password_matches(payload.password.clone(), row.password_hash.clone()).await {
            tracing::warn!("Failed login attempt for: {}", row.email);
            return Err(invalid());
        }
        AdminUser::from(row)
    } else {
        let email_matches = payload.email.to_lowercase() == ADMIN_EMAIL.to_lowercase();
        if !email_matches
            || !password_matches(payload.password.clone(), ADMIN_PASSWORD_HASH.clone()).await
        {
            return Err(invalid());
        }
        AdminUser {
            id: Uuid::nil(),
            username: "admin".to_string(),
            email: payload.email.clone(),
            created_at: Utc::now(),
        }
    };

    let token = issue_token(&user)
        .map_err(|e| ApiError::Internal(format!("failed to create token: {e}")))?;

    tracing::info!("Successful login for user: {}", user.email);
    Ok(respond(StatusCode::OK, "Login successful", LoginData { token, user }))
}

/// POST /api/auth/logout
/// Tokens are stateless; logout only acknowledges.
pub async fn logout(headers: HeaderMap) -> Response {
    if let Some(claims) = extract_bearer_token(&headers).and_then(|t| verify_access_token(t).ok())
    {
        tracing::info!("Logout for user: {}", claims.email);
    }
    respond(StatusCode::OK, "Logged out", ())
}

/// POST /api/auth/forgot-password
/// Always answers the same way so callers cannot probe for accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Response, ApiError> {
    validate_email(&payload.email)?;
    let pool = require_pool()?;

    if let Some(user) = find_admin_by_email(&payload.email).await? {
        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES);

        sqlx::query(
            "INSERT INTO password_resets (admin_user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user.id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .execute(pool.as_ref())
        .await?;

        let mail = OutgoingMail {
            to: user.email.clone(),
            subject: "Reset your House Major password".to_string(),
            body: format!(
                "Use this code to reset your password within {RESET_TOKEN_EXPIRY_MINUTES} minutes: {token}"
            ),
        };
        if let Err(e) = state.mailer.send(mail).await {
            tracing::error!("Failed to send password reset mail: {}", e);
        }
    } else {
        tracing::warn!("Password reset requested for unknown email: {}", payload.email);
    }

    Ok(respond(
        StatusCode::OK,
        "If that email is registered, a reset code has been sent",
        (),
    ))
}

/// POST /api/auth/reset-password
pub async fn reset_password(Json(payload): Json<ResetPasswordRequest>) -> Result<Response, ApiError> {
    required("Reset token", &payload.token)?;
    validate_password(&payload.password)?;
    let pool = require_pool()?;

    let reset = sqlx::query_as::<_, PasswordResetRow>(
        "SELECT id, admin_user_id, expires_at, used FROM password_resets WHERE token_hash = $1",
    )
    .bind(hash_token(payload.token.trim()))
    .fetch_optional(pool.as_ref())
    .await?
    .filter(|r| r.is_usable(Utc::now()))
    .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let password_hash = hash_password(payload.password).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE admin_users SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(&password_hash)
        .bind(reset.admin_user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE password_resets SET used = true WHERE id = $1")
        .bind(reset.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("Password reset for admin {}", reset.admin_user_id);
    Ok(respond(StatusCode::OK, "Password has been reset", ()))
}

/// POST /api/auth/profile
/// Returns the caller's profile; an optional body updates username or password.
pub async fn profile(headers: HeaderMap, body: Bytes) -> Result<Response, ApiError> {
    let claims = require_admin(&headers)?;
    let update: ProfileUpdate = if body.is_empty() {
        ProfileUpdate::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid profile payload: {e}")))?
    };

    let pool = require_pool()?;
    let user_id = claims.user_id()?;
    let row = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, username, email, password_hash, created_at FROM admin_users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Admin user"))?;

    if let Some(new_password) = update.new_password {
        validate_password(&new_password)?;
        let current = update.current_password.unwrap_or_default();
        if !password_matches(current, row.password_hash.clone()).await {
            return Err(ApiError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }
        let password_hash = hash_password(new_password).await?;
        sqlx::query("UPDATE admin_users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(pool.as_ref())
            .await?;
    }

    let user = match update.username.filter(|u| !u.trim().is_empty()) {
        Some(username) => {
            sqlx::query_as::<_, AdminUser>(
                "UPDATE admin_users SET username = $1, updated_at = now() WHERE id = $2 \
                 RETURNING id, username, email, created_at",
            )
            .bind(username.trim())
            .bind(user_id)
            .fetch_one(pool.as_ref())
            .await?
        }
        None => AdminUser::from(row),
    };

    Ok(respond(StatusCode::OK, "Profile retrieved", user))
}

/// GET /api/auth/admin/users
pub async fn list_admins(headers: HeaderMap) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let users = sqlx::query_as::<_, AdminUser>(
        "SELECT id, username, email, created_at FROM admin_users ORDER BY created_at DESC",
    )
    .fetch_all(pool.as_ref())
    .await?;

    Ok(respond(StatusCode::OK, "Admin users retrieved", users))
}

/// POST /api/auth/admin/users
pub async fn create_admin(
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let claims = require_admin(&headers)?;
    let user = insert_admin(&payload).await?;
    tracing::info!("Admin {} created admin user {}", claims.email, user.email);
    Ok(respond(StatusCode::CREATED, "Admin user created", user))
}

/// DELETE /api/auth/admin/users/{id}
pub async fn delete_admin(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let claims = require_admin(&headers)?;
    if claims.sub == id.to_string() {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Admin user"));
    }

    tracing::info!("Admin {} deleted admin user {}", claims.email, id);
    Ok(respond(StatusCode::OK, "Admin user deleted", ()))
}
