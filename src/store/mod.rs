/// Persistence collaborators
///
/// The session core only talks to these traits. Postgres backs them in
/// production; the in-memory versions back the tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::RefreshToken;
use crate::error::AppError;

pub use memory::{InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PostgresRefreshTokenStore, PostgresUserStore};

/// A user account as the auth core sees it
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    /// `StoreError::NotFound` if no account has this email
    async fn get_by_email(&self, email: &str) -> Result<User, AppError>;

    /// # Errors
    /// `StoreError::UniqueViolation` if the email is taken
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn update(&self, id: Uuid, email: &str, hashed_password: &str) -> Result<User, AppError>;

    /// Flag the account as a paying member (payment webhook)
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User, AppError>;
}

/// Refresh token persistence
///
/// Implementations must make `create` and `revoke` atomic so a revoke racing
/// a lookup is never observed half-applied.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Mint and persist a brand-new token for `user_id`
    async fn create(&self, user_id: Uuid) -> Result<RefreshToken, AppError>;

    /// # Errors
    /// `StoreError::NotFound` if the token was never issued
    async fn get(&self, token: &str) -> Result<RefreshToken, AppError>;

    /// Set `revoked_at` if it is not already set. Revoking twice is not an error.
    ///
    /// # Errors
    /// `StoreError::NotFound` if the token was never issued
    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}
