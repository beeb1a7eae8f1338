use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        post::{POST_WITH_AUTHOR, PostWithAuthor},
        user::{USER_COLUMNS, User},
    },
};

/// GET /api/posts. Published posts newest first, with content cut to a
/// 200-character preview.
pub async fn api_posts(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let sql = format!(
        "{POST_WITH_AUTHOR} WHERE p.is_published = 1 ORDER BY p.created_at DESC, p.id DESC"
    );
    let posts = sqlx::query_as::<_, PostWithAuthor>(&sql)
        .fetch_all(&pool)
        .await?;

    let payload: Vec<serde_json::Value> = posts
        .iter()
        .map(|post| {
            json!({
                "id": post.id,
                "title": post.title,
                "content": post.preview(),
                "author": post.author,
                "username": post.username,
                "created_at": post.created_at,
                "updated_at": post.updated_at,
                "is_published": post.is_published,
            })
        })
        .collect();

    Ok(Json(payload))
}

/// GET /api/users/{username}. Public profile summary with post counts.
/// Drafts only show up in `total_posts`, never in `posts_count`.
pub async fn api_user(
    State(pool): State<SqlitePool>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&username)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

    let (total_posts, published_posts) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(is_published), 0) FROM posts WHERE user_id = ?",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({
        "username": user.username,
        "full_name": user.full_name(),
        "bio": user.bio,
        "posts_count": published_posts,
        "total_posts": total_posts,
        "joined": user.created_at,
    })))
}
