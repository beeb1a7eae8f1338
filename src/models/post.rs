use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Column list for full `posts` selects.
pub const POST_COLUMNS: &str =
    "id, user_id, title, content, created_at, updated_at, is_published";

/// Base query for post rows joined with their author's display fields.
/// Callers append WHERE / ORDER BY clauses.
pub const POST_WITH_AUTHOR: &str = "SELECT p.id, p.title, p.content, \
    u.first_name || ' ' || u.last_name AS author, u.username, \
    p.created_at, p.updated_at, p.is_published \
    FROM posts p JOIN users u ON u.id = p.user_id";

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,

    /// Set once at creation.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Refreshed on every successful edit.
    pub updated_at: chrono::DateTime<chrono::Utc>,

    /// False means draft: visible only to the author.
    pub is_published: bool,
}

/// A post row joined with its author, in the shape the read endpoints
/// return.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostWithAuthor {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// The author's full name.
    pub author: String,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub is_published: bool,
}

impl PostWithAuthor {
    /// Listing preview of the content: the first 200 characters, with an
    /// ellipsis appended when anything was cut. Counts characters rather
    /// than bytes so multibyte content never splits mid-character.
    pub fn preview(&self) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(200).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// DTO for creating or editing a post. The same payload serves both
/// handlers since they validate and store the same fields.
#[derive(Debug, Deserialize)]
pub struct SavePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Omitted means published, matching the column default.
    pub is_published: Option<bool>,
}
