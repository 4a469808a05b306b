//! Resource services.
//!
//! Each service owns a handle to the injected store and turns store results into
//! domain results: absence of a row becomes `NotFound`, any other store failure
//! becomes an opaque `Internal` error. Services never touch HTTP types.

pub mod comments;
pub mod likes;
pub mod posts;
pub mod users;

pub use comments::CommentService;
pub use likes::LikeService;
pub use posts::PostService;
pub use users::UserService;

use crate::error::AppError;

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
