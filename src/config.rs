// src/config.rs

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    /// HMAC key for session tokens. Required: there is no safe default
    /// to ship, so startup fails loudly when it is missing.
    pub secret_key: String,

    /// Session lifetime in seconds for a plain login.
    pub session_ttl_secs: u64,

    /// Session lifetime in seconds when the login sets `remember_me`.
    pub remember_ttl_secs: u64,

    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:blog.db".to_string());

        let secret_key = env::var("SECRET_KEY").expect("SECRET_KEY must be set");

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let remember_ttl_secs = env::var("REMEMBER_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2_592_000);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            secret_key,
            session_ttl_secs,
            remember_ttl_secs,
            port,
            rust_log,
        }
    }
}
