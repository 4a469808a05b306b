use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// POST /api/posts
///
/// Wrapped in the blogger role gate by `create_router`.
pub fn blogger_routes() -> Router<AppState> {
    Router::new().route("/api/posts", post(handlers::create_post))
}

/// PUT/DELETE /api/posts/{id}
///
/// Wrapped in the post ownership gate by `create_router`.
pub fn owner_routes() -> Router<AppState> {
    Router::new().route(
        "/api/posts/{id}",
        put(handlers::update_post).delete(handlers::delete_post),
    )
}
