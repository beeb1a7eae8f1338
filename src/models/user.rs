// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Column list for full `users` selects, kept next to the struct so the
/// two stay in sync.
pub const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, bio, created_at, is_active";

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique username. Immutable after registration.
    pub username: String,

    /// Unique email, stored lowercased.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    pub bio: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Deactivated accounts cannot log in or hold sessions.
    pub is_active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The authenticated caller, resolved once per request from its session
/// token. `session_id` is the row backing the token; deleting that row
/// logs the user out everywhere.
#[derive(Debug, Clone, FromRow)]
pub struct CurrentUser {
    pub session_id: i64,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CurrentUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO for registration. Missing fields deserialize as empty strings and
/// fail the required-fields check instead of the JSON parse.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Extends the session to the long-lived TTL.
    #[serde(default)]
    pub remember_me: bool,
}

/// DTO for profile editing. Username and password are immutable and have
/// no fields here.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// Blank bio is stored as NULL.
    #[serde(default)]
    pub bio: String,
}
