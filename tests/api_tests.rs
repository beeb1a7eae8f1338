// tests/api_tests.rs

use microblog::{config::Config, routes, seed, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL and the pool so tests can inspect the database
/// behind the running server.
async fn spawn_app() -> (String, SqlitePool) {
    // A single pinned connection keeps the in-memory database alive for
    // the whole test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        secret_key: "test_secret_for_integration_tests".to_string(),
        session_ttl_secs: 600,
        remember_ttl_secs: 3600,
        port: 0,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Registers a user and returns a session token.
async fn signup_and_login(client: &reqwest::Client, address: &str, username: &str) -> String {
    let response = client
        .post(&format!("{}/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "pass123",
            "confirm_password": "pass123",
            "first_name": "Test",
            "last_name": "User",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .post(&format!("{}/login", address))
        .json(&serde_json::json!({ "username": username, "password": "pass123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().expect("Token not found").to_string()
}

async fn create_post(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    title: &str,
    content: &str,
    is_published: bool,
) {
    let response = client
        .post(&format!("{}/create", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": title,
            "content": content,
            "is_published": is_published,
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
}

async fn list_api_posts(client: &reqwest::Client, address: &str) -> Vec<serde_json::Value> {
    let response = client
        .get(&format!("{}/api/posts", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.expect("Failed to parse posts json")
}

#[tokio::test]
async fn unknown_route_is_404() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn api_posts_truncates_long_content() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &address, "alice").await;
    let long_content = "x".repeat(250);
    create_post(&client, &address, &token, "Long post", &long_content, true).await;

    // Act
    let posts = list_api_posts(&client, &address).await;

    // Assert: first 200 characters plus an ellipsis.
    assert_eq!(posts.len(), 1);
    let expected = format!("{}...", "x".repeat(200));
    assert_eq!(posts[0]["content"].as_str().unwrap(), expected);
}

#[tokio::test]
async fn api_posts_truncation_counts_characters_not_bytes() {
    // Arrange: 250 two-byte characters.
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &address, "alice").await;
    let long_content = "é".repeat(250);
    create_post(&client, &address, &token, "Accents", &long_content, true).await;

    // Act
    let posts = list_api_posts(&client, &address).await;

    // Assert
    let expected = format!("{}...", "é".repeat(200));
    let content = posts[0]["content"].as_str().unwrap();
    assert_eq!(content, expected);
    assert_eq!(content.chars().count(), 203);
}

#[tokio::test]
async fn api_posts_leaves_content_of_200_chars_untouched() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &address, "alice").await;
    let exact_content = "y".repeat(200);
    create_post(&client, &address, &token, "Exact fit", &exact_content, true).await;

    // Act
    let posts = list_api_posts(&client, &address).await;

    // Assert: no ellipsis at exactly the limit.
    assert_eq!(posts[0]["content"].as_str().unwrap(), exact_content);
}

#[tokio::test]
async fn api_posts_excludes_drafts_and_sorts_newest_first() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &address, "alice").await;
    create_post(&client, &address, &token, "First public", "Published content one.", true).await;
    create_post(&client, &address, &token, "Hidden draft", "Draft content in here.", false).await;
    create_post(&client, &address, &token, "Second public", "Published content two.", true).await;

    // Act
    let posts = list_api_posts(&client, &address).await;

    // Assert
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["title"], "Second public");
    assert_eq!(posts[1]["title"], "First public");

    // Listing entries carry author info and timestamps.
    assert_eq!(posts[0]["author"], "Test User");
    assert_eq!(posts[0]["username"], "alice");
    assert_eq!(posts[0]["is_published"], true);
    assert!(posts[0]["id"].as_i64().is_some());
    assert!(posts[0]["created_at"].as_str().is_some());
    assert!(posts[0]["updated_at"].as_str().is_some());
}

#[tokio::test]
async fn api_user_counts_published_and_total_posts() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &address, "alice").await;
    create_post(&client, &address, &token, "Public one", "Published content one.", true).await;
    create_post(&client, &address, &token, "Public two", "Published content two.", true).await;
    create_post(&client, &address, &token, "Only a draft", "Draft content in here.", false).await;

    // Act
    let response = client
        .get(&format!("{}/api/users/alice", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["full_name"], "Test User");
    assert_eq!(body["bio"], serde_json::Value::Null);
    assert_eq!(body["posts_count"], 2);
    assert_eq!(body["total_posts"], 3);
    assert!(body["joined"].as_str().is_some());
}

#[tokio::test]
async fn api_user_unknown_username_is_404() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/api/users/nobody_here", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "User not found!");
}

#[tokio::test]
async fn seeding_populates_sample_accounts_and_posts() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    seed::seed_sample_data(&pool).await.expect("Seeding failed");

    // Assert: three sample users, four sample posts.
    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    let posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 3);
    assert_eq!(posts, 4);

    // The sample credentials work.
    let response = client
        .post(&format!("{}/login", address))
        .json(&serde_json::json!({ "username": "admin", "password": "admin123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Welcome back, Admin!");

    // Three published posts on the listing; the draft stays hidden.
    let listing = list_api_posts(&client, &address).await;
    assert_eq!(listing.len(), 3);
    assert!(listing.iter().all(|p| p["title"] != "Draft: Upcoming Features"));

    // Long bodies are previewed, short ones pass through whole.
    let welcome = listing
        .iter()
        .find(|p| p["title"] == "Welcome to the Blog")
        .expect("Seeded welcome post missing");
    assert!(welcome["content"].as_str().unwrap().ends_with("..."));
    let routine = listing
        .iter()
        .find(|p| p["title"] == "Keeping a Writing Routine")
        .expect("Seeded routine post missing");
    assert!(!routine["content"].as_str().unwrap().ends_with("..."));

    // The admin profile counts its draft in the total only.
    let response = client
        .get(&format!("{}/api/users/admin", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["full_name"], "Admin User");
    assert_eq!(body["posts_count"], 1);
    assert_eq!(body["total_posts"], 2);
}

#[tokio::test]
async fn seeding_twice_does_not_duplicate_anything() {
    // Arrange
    let (_address, pool) = spawn_app().await;

    // Act
    seed::seed_sample_data(&pool).await.expect("Seeding failed");
    seed::seed_sample_data(&pool).await.expect("Seeding failed");

    // Assert
    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    let posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 3);
    assert_eq!(posts, 4);
}
