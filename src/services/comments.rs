use crate::{
    auth::AuthUser,
    authz,
    error::{AppError, StoreError},
    models::{Comment, CommentInput},
    repository::RepositoryState,
};

use super::require_text;

#[derive(Clone)]
pub struct CommentService {
    repo: RepositoryState,
}

impl CommentService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), AppError> {
        match self.repo.get_post_owner(post_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("post not found")),
        }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        post_id: i64,
        input: CommentInput,
    ) -> Result<Comment, AppError> {
        let content = require_text("comment content", &input.content)?;
        self.ensure_post_exists(post_id).await?;

        let comment = self
            .repo
            .create_comment(post_id, user.id, &content)
            .await
            .map_err(|e| match e {
                // The post was deleted after the existence check.
                StoreError::ForeignKeyViolation(_) => AppError::not_found("post not found"),
                other => other.into(),
            })?;
        tracing::info!(comment_id = comment.id, post_id, user_id = user.id, "comment created");
        Ok(comment)
    }

    /// list_for_post
    ///
    /// A missing post is `NotFound`, distinct from a post with no comments.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        self.ensure_post_exists(post_id).await?;
        Ok(self.repo.list_comments_by_post(post_id).await?)
    }

    pub async fn list_for_user(&self, user: &AuthUser) -> Result<Vec<Comment>, AppError> {
        Ok(self.repo.list_comments_by_user(user.id).await?)
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        comment_id: i64,
        input: CommentInput,
    ) -> Result<Comment, AppError> {
        let content = require_text("comment content", &input.content)?;
        authz::ensure_comment_author(self.repo.as_ref(), comment_id, user).await?;

        self.repo
            .update_comment(comment_id, user.id, &content)
            .await?
            .ok_or_else(|| AppError::not_found("comment not found"))
    }

    pub async fn delete(&self, user: &AuthUser, comment_id: i64) -> Result<(), AppError> {
        authz::ensure_comment_author(self.repo.as_ref(), comment_id, user).await?;

        if !self.repo.delete_comment(comment_id, user.id).await? {
            return Err(AppError::not_found("comment not found"));
        }
        tracing::info!(comment_id, user_id = user.id, "comment deleted");
        Ok(())
    }
}
