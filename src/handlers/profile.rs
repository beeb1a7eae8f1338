use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        post::{POST_COLUMNS, Post},
        user::{CurrentUser, UpdateProfileRequest},
    },
    validation::is_valid_email,
};

/// GET /profile. The caller's account details and every post they own,
/// drafts included, newest first.
pub async fn profile(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    );
    let posts = sqlx::query_as::<_, Post>(&sql)
        .bind(current.id)
        .fetch_all(&pool)
        .await?;

    Ok(Json(json!({
        "user": {
            "username": current.username,
            "full_name": current.full_name(),
            "email": current.email,
            "bio": current.bio,
            "created_at": current.created_at,
        },
        "posts": posts,
    })))
}

/// POST /profile/edit. Updates names, email, and bio in one transaction.
/// Username and password are immutable and not accepted here.
pub async fn edit_profile(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let first_name = payload.first_name.trim().to_string();
    let last_name = payload.last_name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let bio = payload.bio.trim().to_string();

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
        return Err(AppError::BadRequest(
            "First name, last name, and email are required!".to_string(),
        ));
    }

    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address!".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    // Keeping one's own email is fine; only someone else owning it conflicts.
    let owner = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
    if owner.is_some_and(|id| id != current.id) {
        return Err(AppError::Conflict(
            "Email already registered by another user!".to_string(),
        ));
    }

    let bio = if bio.is_empty() { None } else { Some(bio) };

    sqlx::query("UPDATE users SET first_name = ?, last_name = ?, email = ?, bio = ? WHERE id = ?")
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&bio)
        .bind(current.id)
        .execute(&mut *tx)
        .await
        .map_err(profile_update_error)?;

    tx.commit().await.map_err(profile_update_error)?;

    tracing::info!("user {} updated profile", current.username);

    Ok(Json(json!({ "message": "Profile updated successfully!" })))
}

fn profile_update_error(e: sqlx::Error) -> AppError {
    if e.to_string().contains("UNIQUE constraint failed: users.email") {
        return AppError::Conflict(
            "Email already registered by another user!".to_string(),
        );
    }
    tracing::error!("profile update failed: {:?}", e);
    AppError::InternalServerError("An error occurred while updating profile.".to_string())
}
