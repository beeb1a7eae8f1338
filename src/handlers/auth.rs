// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use url::Url;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CurrentUser, LoginRequest, RegisterRequest, USER_COLUMNS, User},
    utils::{
        hash::{hash_password, verify_password},
        session,
    },
    validation::{is_valid_email, is_valid_username, validate_password},
};

/// One message for every way a login can fail, so responses never reveal
/// whether the username exists.
const BAD_CREDENTIALS: &str = "Invalid username or password!";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    /// Candidate post-login target, vetted before use.
    pub next: Option<String>,
}

/// GET /register. Authenticated callers are sent back to the index; the
/// form itself is client-rendered.
pub async fn register_form(Extension(current): Extension<Option<CurrentUser>>) -> Response {
    match current {
        Some(_) => Redirect::to("/").into_response(),
        None => Json(json!({})).into_response(),
    }
}

/// Registers a new user.
///
/// Validation runs in a fixed order and the first failure wins, so the
/// client always gets one message. The uniqueness checks and the insert
/// share a transaction. Registration never logs the new user in.
pub async fn register(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<Option<CurrentUser>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let password = payload.password;
    let confirm_password = payload.confirm_password;
    let first_name = payload.first_name.trim().to_string();
    let last_name = payload.last_name.trim().to_string();

    if username.is_empty()
        || email.is_empty()
        || password.is_empty()
        || confirm_password.is_empty()
        || first_name.is_empty()
        || last_name.is_empty()
    {
        return Err(AppError::BadRequest("All fields are required!".to_string()));
    }

    if password != confirm_password {
        return Err(AppError::BadRequest("Passwords do not match!".to_string()));
    }

    if !is_valid_username(&username) {
        return Err(AppError::BadRequest(
            "Username must be 3-20 characters and contain only letters, numbers, and underscores!"
                .to_string(),
        ));
    }

    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address!".to_string(),
        ));
    }

    if let Err(message) = validate_password(&password) {
        return Err(AppError::BadRequest(message.to_string()));
    }

    let mut tx = pool.begin().await?;

    let username_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&mut *tx)
        .await?;
    if username_taken.is_some() {
        return Err(AppError::Conflict("Username already exists!".to_string()));
    }

    let email_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::Conflict("Email already registered!".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash, first_name, last_name, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(&first_name)
    .bind(&last_name)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(registration_error)?;

    tx.commit().await.map_err(registration_error)?;

    tracing::info!("new user registered: {}", username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user_id,
            "username": username,
            "message": "Registration successful! Please log in.",
        })),
    )
        .into_response())
}

/// Maps insert/commit failures. A uniqueness race that slipped past the
/// pre-checks still surfaces as the matching conflict, not a 500.
fn registration_error(e: sqlx::Error) -> AppError {
    let detail = e.to_string();
    if detail.contains("UNIQUE constraint failed: users.username") {
        return AppError::Conflict("Username already exists!".to_string());
    }
    if detail.contains("UNIQUE constraint failed: users.email") {
        return AppError::Conflict("Email already registered!".to_string());
    }
    tracing::error!("failed to register user: {:?}", e);
    AppError::InternalServerError("An error occurred during registration. Please try again.".to_string())
}

/// GET /login. Same gating as the register form.
pub async fn login_form(Extension(current): Extension<Option<CurrentUser>>) -> Response {
    match current {
        Some(_) => Redirect::to("/").into_response(),
        None => Json(json!({})).into_response(),
    }
}

/// Authenticates a user and opens a session.
///
/// On success the response carries the session token, a vetted redirect
/// target taken from the `next` query parameter, and a greeting.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(current): Extension<Option<CurrentUser>>,
    Query(query): Query<NextQuery>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = payload.username.trim().to_string();
    let password = payload.password;

    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter both username and password!".to_string(),
        ));
    }

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&username)
        .fetch_optional(&pool)
        .await?;

    let Some(user) = user else {
        tracing::warn!("login failed: unknown username {:?}", username);
        return Err(AppError::AuthError(BAD_CREDENTIALS.to_string()));
    };

    if !verify_password(&password, &user.password_hash)? {
        tracing::warn!("login failed: bad password for {}", user.username);
        return Err(AppError::AuthError(BAD_CREDENTIALS.to_string()));
    }

    if !user.is_active {
        // Indistinguishable from bad credentials on the wire.
        tracing::warn!("login refused: account {} is deactivated", user.username);
        return Err(AppError::AuthError(BAD_CREDENTIALS.to_string()));
    }

    let ttl_secs = if payload.remember_me {
        config.remember_ttl_secs
    } else {
        config.session_ttl_secs
    };

    let session_id = session::create_session(&pool, user.id, ttl_secs).await?;
    let token = session::sign_session_token(user.id, session_id, &config.secret_key, ttl_secs)?;

    tracing::info!("user {} logged in (session {})", user.username, session_id);

    let redirect = query
        .next
        .as_deref()
        .map(safe_redirect_target)
        .unwrap_or("/");

    Ok(Json(json!({
        "token": token,
        "redirect": redirect,
        "message": format!("Welcome back, {}!", user.first_name),
    }))
    .into_response())
}

/// GET /logout. Destroys the caller's session row, which invalidates the
/// token server-side regardless of its embedded expiry.
pub async fn logout(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    session::delete_session(&pool, current.session_id).await?;

    tracing::info!(
        "user {} logged out (session {})",
        current.username,
        current.session_id
    );

    Ok(Json(json!({
        "message": "You have been logged out successfully.",
    })))
}

/// Vets a client-supplied post-login target. Only same-origin absolute
/// paths survive: anything scheme-relative, backslashed, or parseable as
/// an absolute URL falls back to the index.
fn safe_redirect_target(next: &str) -> &str {
    let safe = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && Url::parse(next).is_err();

    if safe { next } else { "/" }
}
