use crate::{
    error::StoreError,
    models::{Comment, Like, LikeWithUser, Post, Role, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Services receive an
/// `Arc<dyn Repository>` at construction, so tests can swap in an in-memory store.
///
/// Lookups return `Ok(None)` for a missing row; `Err` is reserved for store failures.
/// **Send + Sync + async_trait** make the trait object shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn username_exists(&self, username: &str) -> StoreResult<bool>;

    // --- Posts ---
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>>;
    // Reads only the owner column; used by the ownership gate.
    async fn get_post_owner(&self, id: i64) -> StoreResult<Option<i64>>;
    async fn create_post(&self, user_id: i64, title: &str, content: &str) -> StoreResult<Post>;
    // Owner-scoped: `None` when no row matches both id and owner.
    async fn update_post(&self, id: i64, user_id: i64, title: &str, content: &str) -> StoreResult<Option<Post>>;
    async fn delete_post(&self, id: i64, user_id: i64) -> StoreResult<bool>;

    // --- Comments ---
    async fn create_comment(&self, post_id: i64, user_id: i64, content: &str) -> StoreResult<Comment>;
    async fn get_comment_author(&self, id: i64) -> StoreResult<Option<i64>>;
    async fn list_comments_by_post(&self, post_id: i64) -> StoreResult<Vec<Comment>>;
    async fn list_comments_by_user(&self, user_id: i64) -> StoreResult<Vec<Comment>>;
    async fn update_comment(&self, id: i64, user_id: i64, content: &str) -> StoreResult<Option<Comment>>;
    async fn delete_comment(&self, id: i64, user_id: i64) -> StoreResult<bool>;

    // --- Likes ---
    async fn create_like(&self, user_id: i64, post_id: i64) -> StoreResult<Like>;
    async fn get_like(&self, user_id: i64, post_id: i64) -> StoreResult<Option<Like>>;
    async fn delete_like(&self, user_id: i64, post_id: i64) -> StoreResult<bool>;
    async fn list_likes_by_post(&self, post_id: i64) -> StoreResult<Vec<LikeWithUser>>;
    async fn list_likes_by_user(&self, user_id: i64) -> StoreResult<Vec<Like>>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer.
pub type RepositoryState = Arc<dyn Repository>;

const POST_COLUMNS: &str = "id, title, content, user_id, created_at, updated_at";

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL through an sqlx connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, account_type) VALUES ($1, $2, $3) \
             RETURNING id, username, password_hash, account_type",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, account_type FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    // --- POSTS ---

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC");
        let posts = sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?;
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn get_post_owner(&self, id: i64) -> StoreResult<Option<i64>> {
        let owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    async fn create_post(&self, user_id: i64, title: &str, content: &str) -> StoreResult<Post> {
        let sql = format!(
            "INSERT INTO posts (title, content, user_id) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(title)
            .bind(content)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(post)
    }

    /// update_post
    ///
    /// The `user_id` predicate keeps the write owner-only even if the gate was bypassed.
    async fn update_post(&self, id: i64, user_id: i64, title: &str, content: &str) -> StoreResult<Option<Post>> {
        let sql = format!(
            "UPDATE posts SET title = $3, content = $4, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING {POST_COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(title)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn delete_post(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- COMMENTS ---

    /// create_comment
    ///
    /// Inserts and joins `users` in one statement (CTE) to return the author's username.
    async fn create_comment(&self, post_id: i64, user_id: i64, content: &str) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3)
                RETURNING id, content, user_id, post_id, created_at
            )
            SELECT i.id, i.content, i.user_id, i.post_id, u.username, i.created_at
            FROM inserted i JOIN users u ON i.user_id = u.id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn get_comment_author(&self, id: i64) -> StoreResult<Option<i64>> {
        let author = sqlx::query_scalar::<_, i64>("SELECT user_id FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(author)
    }

    async fn list_comments_by_post(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.content, c.user_id, c.post_id, u.username, c.created_at
            FROM comments c JOIN users u ON c.user_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn list_comments_by_user(&self, user_id: i64) -> StoreResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.content, c.user_id, c.post_id, u.username, c.created_at
            FROM comments c JOIN users u ON c.user_id = u.id
            WHERE c.user_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn update_comment(&self, id: i64, user_id: i64, content: &str) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH updated AS (
                UPDATE comments SET content = $3 WHERE id = $1 AND user_id = $2
                RETURNING id, content, user_id, post_id, created_at
            )
            SELECT up.id, up.content, up.user_id, up.post_id, u.username, up.created_at
            FROM updated up JOIN users u ON up.user_id = u.id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64, user_id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- LIKES ---

    /// create_like
    ///
    /// Plain INSERT: a duplicate (user, post) surfaces as `StoreError::UniqueViolation`
    /// from the `likes_user_post_key` constraint.
    async fn create_like(&self, user_id: i64, post_id: i64) -> StoreResult<Like> {
        let like = sqlx::query_as::<_, Like>(
            "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) \
             RETURNING id, user_id, post_id, created_at",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(like)
    }

    async fn get_like(&self, user_id: i64, post_id: i64) -> StoreResult<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            "SELECT id, user_id, post_id, created_at FROM likes WHERE user_id = $1 AND post_id = $2",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(like)
    }

    async fn delete_like(&self, user_id: i64, post_id: i64) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_likes_by_post(&self, post_id: i64) -> StoreResult<Vec<LikeWithUser>> {
        let likes = sqlx::query_as::<_, LikeWithUser>(
            r#"
            SELECT l.id, l.user_id, l.post_id, u.username
            FROM likes l JOIN users u ON l.user_id = u.id
            WHERE l.post_id = $1
            ORDER BY l.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn list_likes_by_user(&self, user_id: i64) -> StoreResult<Vec<Like>> {
        let likes = sqlx::query_as::<_, Like>(
            "SELECT id, user_id, post_id, created_at FROM likes WHERE user_id = $1 ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }
}
