use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::AppError,
    models::{Role, User},
};

/// The only algorithm tokens are signed with and accepted under.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims
///
/// Payload of a session token. Tokens are never stored server-side: validity derives
/// solely from the signature and `exp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id (`users.id`).
    pub id: i64,
    pub username: String,
    pub account_type: Role,
    /// Issued At, seconds since the epoch.
    pub iat: u64,
    /// Expiration Time, seconds since the epoch.
    pub exp: u64,
}

/// TokenKeys
///
/// Issues and verifies session tokens with the server-held HMAC secret.
#[derive(Clone)]
pub struct TokenKeys {
    secret: String,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let hours = i64::try_from(config.token_ttl_hours).unwrap_or(24);
        Self::new(config.jwt_secret.clone(), Duration::hours(hours))
    }

    /// issue
    ///
    /// Signs `{id, username, account_type, iat, exp = now + ttl}` for the principal.
    /// Fails if no secret is configured.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        if self.secret.is_empty() {
            return Err(AppError::Internal("JWT secret not configured".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            account_type: user.account_type,
            iat: now.timestamp().max(0) as u64,
            exp: (now + self.ttl).timestamp().max(0) as u64,
        };

        encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// verify
    ///
    /// Checks signature, algorithm and expiry (no leeway). Every failure collapses into
    /// `AppError::Unauthorized` so callers cannot tell which check failed.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        if self.secret.is_empty() {
            return Err(AppError::Internal("JWT secret not configured".to_string()));
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "rejected session token");
            AppError::Unauthorized
        })?;

        Ok(AuthUser {
            id: data.claims.id,
            username: data.claims.username,
            role: data.claims.account_type,
        })
    }
}

/// AuthUser
///
/// The verified principal of a request, taken from the token and never from a cache,
/// so every mutating route re-validates identity and role on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// AuthUser Extractor Implementation
///
/// Rejects with `AppError::Unauthorized` (401) when the header is absent or malformed,
/// or when the token fails verification.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        keys.verify(token)
    }
}

/// `Option<AuthUser>` for routes that personalise public data: no header means an
/// anonymous caller, but a header carrying a bad token is still rejected.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }
        let user = <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        Ok(Some(user))
    }
}

// --- Password credentials ---

/// Hashes a password into an Argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AppError::Internal(format!("salt generation failed: {e}")))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("salt encoding failed: {e}")))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?
        .to_string();
    Ok(phc)
}

/// Checks a password against a stored PHC string. Unparsable hashes never verify.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
