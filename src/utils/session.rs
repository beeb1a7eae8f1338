use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    error::{AppError, GENERIC_ERROR},
    models::user::CurrentUser,
    state::AppState,
};

/// Denial message for requests that reach a protected route without a
/// live session.
pub const LOGIN_REQUIRED: &str = "Please log in to access this page.";

/// Token claims. The token is only half of a session: `sid` must still
/// point at a live row in the `sessions` table, so deleting the row at
/// logout invalidates the token no matter what `exp` says.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// The backing `sessions` row.
    pub sid: i64,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Inserts a session row for the user and returns its id. Expired rows
/// are swept on the way in; nothing else removes them except logout.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    ttl_secs: u64,
) -> Result<i64, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(ttl_secs as i64);

    sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;

    let session_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sessions (user_id, created_at, expires_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(session_id)
}

/// Deletes a session row. Tokens carrying its id stop resolving at once.
pub async fn delete_session(pool: &SqlitePool, session_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Signs a session token over the user id and session row id.
pub fn sign_session_token(
    user_id: i64,
    session_id: i64,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| {
            tracing::error!("system clock error: {}", e);
            AppError::InternalServerError(GENERIC_ERROR.to_string())
        })?
        .as_secs() as usize
        + ttl_secs as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        sid: session_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token signing failed: {}", e);
        AppError::InternalServerError(GENERIC_ERROR.to_string())
    })
}

/// Decodes and verifies a session token. Any defect (bad signature,
/// expired, malformed) yields `None`; the caller treats that as anonymous.
fn decode_session_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Resolves a token to the caller it represents. `None` means anonymous:
/// the token is missing its session row, expired, or the account was
/// deactivated. Only a storage failure is an error.
async fn resolve_current_user(
    pool: &SqlitePool,
    secret: &str,
    token: &str,
) -> Result<Option<CurrentUser>, AppError> {
    let Some(claims) = decode_session_token(token, secret) else {
        return Ok(None);
    };
    let Ok(user_id) = claims.sub.parse::<i64>() else {
        return Ok(None);
    };

    let current = sqlx::query_as::<_, CurrentUser>(
        "SELECT s.id AS session_id, u.id, u.username, u.email, \
                u.first_name, u.last_name, u.bio, u.created_at \
         FROM sessions s \
         JOIN users u ON u.id = s.user_id \
         WHERE s.id = ? AND s.user_id = ? AND s.expires_at > ? AND u.is_active = 1",
    )
    .bind(claims.sid)
    .bind(user_id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(current)
}

/// Axum Middleware: current-user resolution.
///
/// Runs on every request. Reads the 'Authorization: Bearer <token>' header
/// when present and injects `Option<CurrentUser>` into the request
/// extensions. An invalid token is treated as no token at all; handlers
/// that require a caller sit behind `require_auth` instead.
pub async fn load_current_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let current = match token {
        Some(token) => resolve_current_user(&state.pool, &state.config.secret_key, token).await?,
        None => None,
    };

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}

/// Axum Middleware: authentication gate.
///
/// Must run AFTER `load_current_user`. Turns an anonymous caller into a
/// 401 and re-inserts the plain `CurrentUser` so protected handlers can
/// extract it without unwrapping.
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let current = req
        .extensions()
        .get::<Option<CurrentUser>>()
        .cloned()
        .flatten()
        .ok_or_else(|| AppError::AuthError(LOGIN_REQUIRED.to_string()))?;

    req.extensions_mut().insert(current);
    Ok(next.run(req).await)
}
