//! Authorization gate.
//!
//! Two independent checks, both evaluated against the principal verified for the
//! current request:
//!
//! - role: the route declares a required [`Role`]; a mismatch is rejected before any
//!   store access.
//! - ownership: the resource's owner id is read (one column, one query) and compared
//!   with the principal's id. A missing resource is `404`, a mismatch `403`.
//!
//! The middleware functions wrap these for use with `route_layer`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState, auth::AuthUser, error::AppError, handlers::ValidatedPath, models::Role,
    repository::Repository,
};

/// Rejects the principal unless it holds `required`.
pub fn authorize_role(user: &AuthUser, required: Role) -> Result<(), AppError> {
    if user.role == required {
        Ok(())
    } else {
        Err(AppError::forbidden("insufficient permissions"))
    }
}

/// Rejects the principal unless it is the owner of the resource.
pub fn authorize_owner(user: &AuthUser, owner_id: i64) -> Result<(), AppError> {
    if user.id == owner_id {
        Ok(())
    } else {
        Err(AppError::forbidden("you can only modify your own resources"))
    }
}

/// Loads the post's owner id and applies [`authorize_owner`].
pub async fn ensure_post_owner(
    repo: &dyn Repository,
    post_id: i64,
    user: &AuthUser,
) -> Result<(), AppError> {
    let owner = repo
        .get_post_owner(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post not found"))?;
    authorize_owner(user, owner).map_err(|_| AppError::forbidden("you can only modify your own posts"))
}

/// Loads the comment's author id and applies [`authorize_owner`].
pub async fn ensure_comment_author(
    repo: &dyn Repository,
    comment_id: i64,
    user: &AuthUser,
) -> Result<(), AppError> {
    let author = repo
        .get_comment_author(comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("comment not found"))?;
    authorize_owner(user, author)
        .map_err(|_| AppError::forbidden("you can only modify your own comments"))
}

// --- Route middleware ---

/// require_auth
///
/// Guards every route of the authenticated router. `AuthUser` rejects with 401 before
/// the handler runs.
pub async fn require_auth(_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// require_blogger
///
/// Role gate for authoring routes. Runs before any store access.
pub async fn require_blogger(
    user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize_role(&user, Role::Blogger).inspect_err(|_| {
        tracing::warn!(user_id = user.id, role = %user.role, "role check failed");
    })?;
    Ok(next.run(request).await)
}

/// require_post_owner
///
/// Ownership gate for `PUT/DELETE /api/posts/{id}`.
pub async fn require_post_owner(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedPath(post_id): ValidatedPath<i64>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    ensure_post_owner(state.repo.as_ref(), post_id, &user)
        .await
        .inspect_err(|e| {
            tracing::warn!(user_id = user.id, post_id, error = %e, "ownership check failed");
        })?;
    Ok(next.run(request).await)
}
