use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes open to any verified principal, blogger or viewer. Author-only comment
/// mutations are checked by the comment service against the comment's author.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/api/users/me", get(handlers::get_me))
        .route("/api/users/me/likes", get(handlers::get_my_likes))
        .route("/api/users/me/comments", get(handlers::get_my_comments))
        // --- Likes ---
        .route(
            "/api/posts/{id}/like",
            post(handlers::like_post).delete(handlers::unlike_post),
        )
        // --- Comments ---
        .route("/api/posts/{id}/comments", post(handlers::add_comment))
        .route(
            "/api/comments/{id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}
