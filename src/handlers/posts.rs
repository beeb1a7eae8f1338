use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        post::{POST_COLUMNS, POST_WITH_AUTHOR, Post, PostWithAuthor, SavePostRequest},
        user::CurrentUser,
    },
};

/// GET /. Published posts with author names, newest first.
pub async fn index(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let sql = format!(
        "{POST_WITH_AUTHOR} WHERE p.is_published = 1 ORDER BY p.created_at DESC, p.id DESC"
    );
    let posts = sqlx::query_as::<_, PostWithAuthor>(&sql)
        .fetch_all(&pool)
        .await?;

    Ok(Json(posts))
}

/// GET /post/{id}. A draft answers the same 404 as a missing id unless the
/// caller is its author, so draft existence is never revealed. One query
/// covers lookup and visibility; an anonymous caller binds NULL, which
/// matches no author.
pub async fn view_post(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<Option<CurrentUser>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&post_id)?;

    let sql =
        format!("{POST_WITH_AUTHOR} WHERE p.id = ? AND (p.is_published = 1 OR p.user_id = ?)");
    let post = sqlx::query_as::<_, PostWithAuthor>(&sql)
        .bind(post_id)
        .bind(current.map(|user| user.id))
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found!".to_string()))?;

    Ok(Json(post))
}

/// GET /create. The form is client-rendered; this endpoint only exists to
/// run the auth gate before it.
pub async fn create_form(Extension(_current): Extension<CurrentUser>) -> impl IntoResponse {
    Json(json!({}))
}

/// Creates a post owned by the caller.
pub async fn create_post(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<SavePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = payload.title.trim().to_string();
    let content = payload.content.trim().to_string();
    let is_published = payload.is_published.unwrap_or(true);

    validate_post_fields(&title, &content)?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let post_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO posts (user_id, title, content, created_at, updated_at, is_published) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(current.id)
    .bind(&title)
    .bind(&content)
    .bind(now)
    .bind(now)
    .bind(is_published)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("failed to create post: {:?}", e);
        AppError::InternalServerError("An error occurred while creating the post.".to_string())
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!("failed to create post: {:?}", e);
        AppError::InternalServerError("An error occurred while creating the post.".to_string())
    })?;

    tracing::info!("user {} created post {}", current.username, post_id);

    let message = if is_published {
        "Post published successfully!"
    } else {
        "Post saved as draft successfully!"
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": post_id, "message": message })),
    ))
}

/// GET /edit/{id}. Returns the post as form prefill after the ownership
/// check. The author fields come from the caller, who is the owner.
pub async fn edit_form(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let mut conn = pool.acquire().await?;
    let post = fetch_owned_post(
        &mut conn,
        post_id,
        current.id,
        "You can only edit your own posts!",
    )
    .await?;

    Ok(Json(json!({
        "id": post.id,
        "title": post.title,
        "content": post.content,
        "author": current.full_name(),
        "username": current.username,
        "created_at": post.created_at,
        "updated_at": post.updated_at,
        "is_published": post.is_published,
    })))
}

/// Updates a post. Check order: existence, then ownership, then field
/// validation. Any failure leaves every column untouched.
pub async fn update_post(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    Json(payload): Json<SavePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let mut tx = pool.begin().await?;

    let post = fetch_owned_post(
        &mut tx,
        post_id,
        current.id,
        "You can only edit your own posts!",
    )
    .await?;

    let title = payload.title.trim().to_string();
    let content = payload.content.trim().to_string();
    let is_published = payload.is_published.unwrap_or(true);

    validate_post_fields(&title, &content)?;

    sqlx::query(
        "UPDATE posts SET title = ?, content = ?, is_published = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&title)
    .bind(&content)
    .bind(is_published)
    .bind(Utc::now())
    .bind(post.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("failed to update post {}: {:?}", post_id, e);
        AppError::InternalServerError("An error occurred while updating the post.".to_string())
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!("failed to update post {}: {:?}", post_id, e);
        AppError::InternalServerError("An error occurred while updating the post.".to_string())
    })?;

    tracing::info!("user {} updated post {}", current.username, post_id);

    Ok(Json(json!({
        "id": post.id,
        "message": "Post updated successfully!",
    })))
}

/// Deletes a post after the same existence and ownership checks as edit.
pub async fn delete_post(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let mut tx = pool.begin().await?;

    let post = fetch_owned_post(
        &mut tx,
        post_id,
        current.id,
        "You can only delete your own posts!",
    )
    .await?;

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(post.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("failed to delete post {}: {:?}", post_id, e);
            AppError::InternalServerError("An error occurred while deleting the post.".to_string())
        })?;

    tx.commit().await.map_err(|e| {
        tracing::error!("failed to delete post {}: {:?}", post_id, e);
        AppError::InternalServerError("An error occurred while deleting the post.".to_string())
    })?;

    tracing::info!("user {} deleted post {}", current.username, post_id);

    Ok(Json(json!({ "message": "Post deleted successfully!" })))
}

/// Parses the id path segment. A non-numeric segment answers the same 404
/// as an unknown post, never a malformed-request error.
fn parse_post_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound("Post not found!".to_string()))
}

/// Loads a post and enforces ownership. A missing id is a 404; someone
/// else's post is a 403 carrying the handler's denial message.
async fn fetch_owned_post(
    conn: &mut sqlx::SqliteConnection,
    post_id: i64,
    user_id: i64,
    denial: &str,
) -> Result<Post, AppError> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
    let post = sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found!".to_string()))?;

    if post.user_id != user_id {
        return Err(AppError::Forbidden(denial.to_string()));
    }

    Ok(post)
}

/// Shared field checks for create and edit, in the order the messages are
/// documented: presence, then title length, then content length.
fn validate_post_fields(title: &str, content: &str) -> Result<(), AppError> {
    if title.is_empty() || content.is_empty() {
        return Err(AppError::BadRequest(
            "Title and content are required!".to_string(),
        ));
    }
    if title.chars().count() < 3 {
        return Err(AppError::BadRequest(
            "Title must be at least 3 characters long!".to_string(),
        ));
    }
    if content.chars().count() < 10 {
        return Err(AppError::BadRequest(
            "Content must be at least 10 characters long!".to_string(),
        ));
    }
    Ok(())
}
