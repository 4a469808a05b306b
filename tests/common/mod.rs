#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use blog_api::{
    AppConfig, AppState, AuthUser, Repository, RepositoryState, StoreError, create_router,
    models::{Comment, Like, LikeWithUser, Post, RegisterRequest, Role, User},
};
use chrono::Utc;
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

// --- In-memory Repository ---

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn has_post(&self, post_id: i64) -> bool {
        self.posts.iter().any(|p| p.id == post_id)
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}

/// InMemoryRepository
///
/// Fake store with the same uniqueness rules as the schema. Flags let tests simulate a
/// lost pre-check race or a broken database, and counters record store traffic.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    /// Pre-checks (`username_exists`, `get_like`) report "absent", as if a concurrent
    /// request inserted the row between check and write.
    pub simulate_races: AtomicBool,
    /// `get_post_owner` reports absent posts as existing (owner 0), as if the post was
    /// deleted right after the check. Writes referencing it then hit the foreign key.
    pub deleted_after_check: AtomicBool,
    /// Every call fails with an opaque store error.
    pub fail_all: AtomicBool,
    /// Every call sleeps this long before touching the tables.
    pub delay_ms: AtomicU64,
    /// Total number of calls.
    pub calls: AtomicUsize,
    /// Number of single-column owner reads (`get_post_owner`).
    pub owner_reads: AtomicUsize,
    /// Number of full post loads (`get_post`).
    pub post_loads: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    pub fn like_rows(&self, user_id: i64, post_id: i64) -> usize {
        self.tables
            .lock()
            .unwrap()
            .likes
            .iter()
            .filter(|l| l.user_id == user_id && l.post_id == post_id)
            .count()
    }

    pub fn reset_counters(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.owner_reads.store(0, Ordering::SeqCst);
        self.post_loads.store(0, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn enter(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection refused".to_string()));
        }
        Ok(self.tables.lock().unwrap())
    }

    fn racing(&self) -> bool {
        self.simulate_races.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<User, StoreError> {
        let mut t = self.enter().await?;
        if t.users.iter().any(|u| u.username == username) {
            return Err(StoreError::UniqueViolation("users_username_key".to_string()));
        }
        let user = User {
            id: t.next_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            account_type: role,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let t = self.enter().await?;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let t = self.enter().await?;
        if self.racing() {
            return Ok(false);
        }
        Ok(t.users.iter().any(|u| u.username == username))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let t = self.enter().await?;
        Ok(t.posts.iter().rev().cloned().collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let t = self.enter().await?;
        self.post_loads.fetch_add(1, Ordering::SeqCst);
        Ok(t.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_post_owner(&self, id: i64) -> Result<Option<i64>, StoreError> {
        let t = self.enter().await?;
        self.owner_reads.fetch_add(1, Ordering::SeqCst);
        let owner = t.posts.iter().find(|p| p.id == id).map(|p| p.user_id);
        if owner.is_none() && self.deleted_after_check.load(Ordering::SeqCst) {
            return Ok(Some(0));
        }
        Ok(owner)
    }

    async fn create_post(&self, user_id: i64, title: &str, content: &str) -> Result<Post, StoreError> {
        let mut t = self.enter().await?;
        let now = Utc::now();
        let post = Post {
            id: t.next_id(),
            title: title.to_string(),
            content: content.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, user_id: i64, title: &str, content: &str) -> Result<Option<Post>, StoreError> {
        let mut t = self.enter().await?;
        let Some(post) = t.posts.iter_mut().find(|p| p.id == id && p.user_id == user_id) else {
            return Ok(None);
        };
        post.title = title.to_string();
        post.content = content.to_string();
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64, user_id: i64) -> Result<bool, StoreError> {
        let mut t = self.enter().await?;
        let before = t.posts.len();
        t.posts.retain(|p| !(p.id == id && p.user_id == user_id));
        let deleted = t.posts.len() < before;
        if deleted {
            // ON DELETE CASCADE
            t.comments.retain(|c| c.post_id != id);
            t.likes.retain(|l| l.post_id != id);
        }
        Ok(deleted)
    }

    async fn create_comment(&self, post_id: i64, user_id: i64, content: &str) -> Result<Comment, StoreError> {
        let mut t = self.enter().await?;
        if !t.has_post(post_id) {
            return Err(StoreError::ForeignKeyViolation("comments_post_id_fkey".to_string()));
        }
        let comment = Comment {
            id: t.next_id(),
            content: content.to_string(),
            user_id,
            post_id,
            username: t.username(user_id),
            created_at: Utc::now(),
        };
        t.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment_author(&self, id: i64) -> Result<Option<i64>, StoreError> {
        let t = self.enter().await?;
        Ok(t.comments.iter().find(|c| c.id == id).map(|c| c.user_id))
    }

    async fn list_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let t = self.enter().await?;
        Ok(t.comments.iter().filter(|c| c.post_id == post_id).cloned().collect())
    }

    async fn list_comments_by_user(&self, user_id: i64) -> Result<Vec<Comment>, StoreError> {
        let t = self.enter().await?;
        Ok(t.comments.iter().rev().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn update_comment(&self, id: i64, user_id: i64, content: &str) -> Result<Option<Comment>, StoreError> {
        let mut t = self.enter().await?;
        let Some(comment) = t.comments.iter_mut().find(|c| c.id == id && c.user_id == user_id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: i64, user_id: i64) -> Result<bool, StoreError> {
        let mut t = self.enter().await?;
        let before = t.comments.len();
        t.comments.retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(t.comments.len() < before)
    }

    async fn create_like(&self, user_id: i64, post_id: i64) -> Result<Like, StoreError> {
        let mut t = self.enter().await?;
        if !t.has_post(post_id) {
            return Err(StoreError::ForeignKeyViolation("likes_post_id_fkey".to_string()));
        }
        if t.likes.iter().any(|l| l.user_id == user_id && l.post_id == post_id) {
            return Err(StoreError::UniqueViolation("likes_user_post_key".to_string()));
        }
        let like = Like {
            id: t.next_id(),
            user_id,
            post_id,
            created_at: Utc::now(),
        };
        t.likes.push(like.clone());
        Ok(like)
    }

    async fn get_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, StoreError> {
        let t = self.enter().await?;
        if self.racing() {
            return Ok(None);
        }
        Ok(t.likes.iter().find(|l| l.user_id == user_id && l.post_id == post_id).cloned())
    }

    async fn delete_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
        let mut t = self.enter().await?;
        let before = t.likes.len();
        t.likes.retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        Ok(t.likes.len() < before)
    }

    async fn list_likes_by_post(&self, post_id: i64) -> Result<Vec<LikeWithUser>, StoreError> {
        let t = self.enter().await?;
        Ok(t.likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .map(|l| LikeWithUser {
                id: l.id,
                user_id: l.user_id,
                post_id: l.post_id,
                username: t.username(l.user_id),
            })
            .collect())
    }

    async fn list_likes_by_user(&self, user_id: i64) -> Result<Vec<Like>, StoreError> {
        let t = self.enter().await?;
        Ok(t.likes.iter().rev().filter(|l| l.user_id == user_id).cloned().collect())
    }
}

// --- State helpers ---

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn app_state(repo: Arc<InMemoryRepository>) -> AppState {
    AppState::new(repo as RepositoryState, test_config())
}

pub fn test_router(repo: Arc<InMemoryRepository>) -> Router {
    create_router(app_state(repo))
}

pub fn test_router_with_config(repo: Arc<InMemoryRepository>, config: AppConfig) -> Router {
    create_router(AppState::new(repo as RepositoryState, config))
}

/// A registered principal plus a valid token for it.
pub struct Account {
    pub user: AuthUser,
    pub token: String,
}

pub async fn register_and_login(state: &AppState, username: &str, role: Role) -> Account {
    let user = state
        .users
        .register(RegisterRequest {
            username: username.to_string(),
            password: "pw".to_string(),
            account_type: role,
        })
        .await
        .expect("registration should succeed");
    let token = state
        .users
        .login(username, "pw")
        .await
        .expect("login should succeed");
    Account {
        user: AuthUser {
            id: user.id,
            username: user.username,
            role: user.account_type,
        },
        token,
    }
}
