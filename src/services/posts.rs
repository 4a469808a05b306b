use crate::{
    auth::AuthUser,
    error::AppError,
    models::{Post, PostInput, PostWithComments},
    repository::RepositoryState,
};

use super::require_text;

/// PostService
///
/// Post CRUD. Role and ownership are enforced by the gate before these methods run;
/// update and delete are additionally owner-scoped in the store.
#[derive(Clone)]
pub struct PostService {
    repo: RepositoryState,
}

impl PostService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.repo.list_posts().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Post, AppError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("post not found"))
    }

    pub async fn get_with_comments(&self, id: i64) -> Result<PostWithComments, AppError> {
        let post = self.get(id).await?;
        let comments = self.repo.list_comments_by_post(id).await?;
        Ok(PostWithComments { post, comments })
    }

    /// create
    ///
    /// Both fields must be non-empty after trimming; nothing is written otherwise.
    pub async fn create(&self, user: &AuthUser, input: PostInput) -> Result<Post, AppError> {
        let title = require_text("title", &input.title)?;
        let content = require_text("content", &input.content)?;

        let post = self.repo.create_post(user.id, &title, &content).await?;
        tracing::info!(post_id = post.id, user_id = user.id, "post created");
        Ok(post)
    }

    pub async fn update(&self, user: &AuthUser, id: i64, input: PostInput) -> Result<Post, AppError> {
        let title = require_text("title", &input.title)?;
        let content = require_text("content", &input.content)?;

        // `None` here means the row vanished (or changed hands) after the gate ran.
        let post = self
            .repo
            .update_post(id, user.id, &title, &content)
            .await?
            .ok_or_else(|| AppError::not_found("post not found"))?;
        tracing::info!(post_id = id, user_id = user.id, "post updated");
        Ok(post)
    }

    pub async fn delete(&self, user: &AuthUser, id: i64) -> Result<(), AppError> {
        if !self.repo.delete_post(id, user.id).await? {
            return Err(AppError::not_found("post not found"));
        }
        tracing::info!(post_id = id, user_id = user.id, "post deleted");
        Ok(())
    }
}
