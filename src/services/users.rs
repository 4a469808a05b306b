use crate::{
    auth::{self, TokenKeys},
    error::{AppError, StoreError},
    models::{RegisterRequest, User},
    repository::RepositoryState,
};

use super::require_text;

/// UserService
///
/// Registration and login. Login mints a session token with the configured keys.
#[derive(Clone)]
pub struct UserService {
    repo: RepositoryState,
    tokens: TokenKeys,
}

impl UserService {
    pub fn new(repo: RepositoryState, tokens: TokenKeys) -> Self {
        Self { repo, tokens }
    }

    /// register
    ///
    /// Creates a principal with a hashed password. A duplicate username is rejected by
    /// the pre-check, and a concurrent duplicate that slips past it is rejected by the
    /// unique constraint with the same error.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let username = require_text("username", &req.username)?;
        if req.password.trim().is_empty() {
            return Err(AppError::validation("password cannot be empty"));
        }

        if self.repo.username_exists(&username).await? {
            return Err(AppError::UsernameExists);
        }

        let password = req.password;
        let password_hash = run_blocking(move || auth::hash_password(&password)).await??;
        let user = self
            .repo
            .create_user(&username, &password_hash, req.account_type)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => AppError::UsernameExists,
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, role = %user.account_type, "user registered");
        Ok(user)
    }

    /// login
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .repo
            .find_user_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let stored_hash = user.password_hash.clone();
        let password = password.to_string();
        let matches =
            run_blocking(move || auth::verify_password(&stored_hash, &password)).await?;
        if !matches {
            tracing::info!(user_id = user.id, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        self.tokens.issue(&user)
    }
}

/// Runs Argon2 work on the blocking pool so it does not stall the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))
}
