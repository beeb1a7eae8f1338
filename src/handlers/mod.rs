// src/handlers/mod.rs

pub mod api;
pub mod auth;
pub mod posts;
pub mod profile;
