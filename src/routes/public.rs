use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. None of them mutate state except account
/// creation and login.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts/{id}", get(handlers::get_post))
        .route("/api/posts/{id}/full", get(handlers::get_post_with_comments))
        .route("/api/posts/{id}/comments", get(handlers::get_comments))
        // Optional token: personalises `is_liked_by_user`.
        .route("/api/posts/{id}/likes", get(handlers::get_post_likes))
}
