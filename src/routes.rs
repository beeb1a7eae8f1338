// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{api, auth, posts, profile},
    state::AppState,
    utils::session::{load_current_user, require_auth},
};

/// Assembles the main application router.
///
/// * Public routes resolve the caller when a token is present but never
///   require one.
/// * Protected routes sit behind `require_auth`.
/// * Applies global middleware (current-user resolution, Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/", get(posts::index))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/post/{id}", get(posts::view_post))
        .route("/api/posts", get(api::api_posts))
        .route("/api/users/{username}", get(api::api_user));

    let protected_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route("/profile", get(profile::profile))
        .route("/profile/edit", post(profile::edit_profile))
        .route("/create", get(posts::create_form).post(posts::create_post))
        .route("/edit/{id}", get(posts::edit_form).post(posts::update_post))
        .route("/delete/{id}", post(posts::delete_post))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            load_current_user,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
