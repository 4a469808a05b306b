use crate::{
    auth::AuthUser,
    error::{AppError, StoreError},
    models::{Like, PostLikes},
    repository::RepositoryState,
};

#[derive(Clone)]
pub struct LikeService {
    repo: RepositoryState,
}

impl LikeService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    async fn post_owner(&self, post_id: i64) -> Result<i64, AppError> {
        self.repo
            .get_post_owner(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("post not found"))
    }

    /// like
    ///
    /// Checks, in order: the post exists, the caller does not own it, the caller has not
    /// liked it yet. A concurrent duplicate caught by the unique constraint maps to the
    /// same conflict as the pre-check, and a post deleted meanwhile to the same 404.
    pub async fn like(&self, user: &AuthUser, post_id: i64) -> Result<Like, AppError> {
        let owner = self.post_owner(post_id).await?;
        if owner == user.id {
            return Err(AppError::forbidden("cannot like your own post"));
        }
        if self.repo.get_like(user.id, post_id).await?.is_some() {
            return Err(AppError::conflict("you have already liked this post"));
        }

        let like = self
            .repo
            .create_like(user.id, post_id)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => AppError::conflict("you have already liked this post"),
                StoreError::ForeignKeyViolation(_) => AppError::not_found("post not found"),
                other => other.into(),
            })?;
        tracing::info!(post_id, user_id = user.id, "post liked");
        Ok(like)
    }

    pub async fn unlike(&self, user: &AuthUser, post_id: i64) -> Result<(), AppError> {
        self.post_owner(post_id).await?;
        if !self.repo.delete_like(user.id, post_id).await? {
            return Err(AppError::not_found("like not found"));
        }
        tracing::info!(post_id, user_id = user.id, "post unliked");
        Ok(())
    }

    /// likes_for_post
    ///
    /// `viewer` is the optional caller; anonymous callers get `is_liked_by_user = false`.
    pub async fn likes_for_post(
        &self,
        post_id: i64,
        viewer: Option<&AuthUser>,
    ) -> Result<PostLikes, AppError> {
        self.post_owner(post_id).await?;
        let likes = self.repo.list_likes_by_post(post_id).await?;
        let is_liked_by_user = viewer.is_some_and(|v| likes.iter().any(|l| l.user_id == v.id));

        Ok(PostLikes {
            post_id,
            like_count: likes.len() as i64,
            is_liked_by_user,
            likes,
        })
    }

    pub async fn likes_for_user(&self, user: &AuthUser) -> Result<Vec<Like>, AppError> {
        Ok(self.repo.list_likes_by_user(user.id).await?)
    }
}
