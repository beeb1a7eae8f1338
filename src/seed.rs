// src/seed.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{error::AppError, utils::hash::hash_password};

struct SeedUser {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    bio: &'static str,
}

struct SeedPost {
    /// Username of the owning seed user.
    author: &'static str,
    title: &'static str,
    content: &'static str,
    is_published: bool,
}

const SEED_USERS: [SeedUser; 3] = [
    SeedUser {
        username: "admin",
        email: "admin@blog.com",
        password: "admin123",
        first_name: "Admin",
        last_name: "User",
        bio: "Blog administrator and content manager",
    },
    SeedUser {
        username: "john_doe",
        email: "john@example.com",
        password: "john123",
        first_name: "John",
        last_name: "Doe",
        bio: "Tech enthusiast and blogger who loves sharing knowledge about web development",
    },
    SeedUser {
        username: "jane_smith",
        email: "jane@example.com",
        password: "jane123",
        first_name: "Jane",
        last_name: "Smith",
        bio: "Web developer and UI/UX designer passionate about creating beautiful user experiences",
    },
];

// The first and third bodies run past 200 characters so the listing
// preview is visible on a fresh database.
const SEED_POSTS: [SeedPost; 4] = [
    SeedPost {
        author: "admin",
        title: "Welcome to the Blog",
        content: "This space is shared by everyone with an account. Sign in to write your \
own posts, keep drafts around until they are ready, and fill in a short bio so readers know \
who you are. Published posts show up on the front page right away, newest first, and every \
author keeps full control over editing and deleting their own work.",
        is_published: true,
    },
    SeedPost {
        author: "john_doe",
        title: "Keeping a Writing Routine",
        content: "Writing regularly is easier when the tooling stays out of the way. I keep a \
plain text file of ideas, pick one every few days, and draft it in a single sitting. The \
backlog never shrinks.",
        is_published: true,
    },
    SeedPost {
        author: "jane_smith",
        title: "Notes on Readable Interfaces",
        content: "A few habits that keep interfaces readable:\n\n1. Prefer one obvious action \
per screen\n2. Keep labels short and consistent\n3. Let whitespace do the grouping\n4. Show \
state changes where the eye already is\n5. Test with real content, not placeholder text\n\n\
None of these are rules, but breaking two at once usually shows.",
        is_published: true,
    },
    SeedPost {
        author: "admin",
        title: "Draft: Upcoming Features",
        content: "Things to add over the next few releases:\n\n- Comments under posts\n- Tags \
and simple search\n- A nicer editor\n\nNothing here is final, which is why this one stays a \
draft.",
        is_published: false,
    },
];

/// Inserts sample users and posts on first boot, inside one transaction.
/// A non-empty users table makes this a no-op, so restarts never
/// duplicate anything.
pub async fn seed_sample_data(pool: &SqlitePool) -> Result<(), AppError> {
    let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    if user_count > 0 {
        return Ok(());
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for user in SEED_USERS {
        let password_hash = hash_password(user.password)?;

        sqlx::query(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, bio, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(&password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.bio)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for post in SEED_POSTS {
        sqlx::query(
            "INSERT INTO posts (user_id, title, content, created_at, updated_at, is_published) \
             VALUES ((SELECT id FROM users WHERE username = ?), ?, ?, ?, ?, ?)",
        )
        .bind(post.author)
        .bind(post.title)
        .bind(post.content)
        .bind(now)
        .bind(now)
        .bind(post.is_published)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Sample data created: {} users, {} posts.",
        SEED_USERS.len(),
        SEED_POSTS.len()
    );

    Ok(())
}
