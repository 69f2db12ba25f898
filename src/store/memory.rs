use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{RefreshTokenStore, User, UserStore};
use crate::auth::{default_refresh_token_lifetime, RefreshToken};
use crate::error::{AppError, StoreError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Store(StoreError::Unavailable("store lock poisoned".to_string())))
}

/// Users held in process memory
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let users = lock(&self.users)?;
        users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::Store(StoreError::NotFound))
    }

    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Store(StoreError::UniqueViolation(email.to_string())));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(AppError::Store(StoreError::UniqueViolation(email.to_string())));
        }

        let user = users.get_mut(&id).ok_or(AppError::Store(StoreError::NotFound))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        let user = users.get_mut(&id).ok_or(AppError::Store(StoreError::NotFound))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// Refresh tokens held in process memory, keyed by token string
///
/// Every operation runs under one lock, so revoke and get are linearizable.
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
    lifetime: Duration,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::with_lifetime(default_refresh_token_lifetime())
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            lifetime,
        }
    }
}

impl Default for InMemoryRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(&self, user_id: Uuid) -> Result<RefreshToken, AppError> {
        let token = RefreshToken::issue(user_id, self.lifetime);
        lock(&self.tokens)?.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<RefreshToken, AppError> {
        lock(&self.tokens)?
            .get(token)
            .cloned()
            .ok_or(AppError::Store(StoreError::NotFound))
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut tokens = lock(&self.tokens)?;
        let record = tokens.get_mut(token).ok_or(AppError::Store(StoreError::NotFound))?;
        record.revoke_at(Utc::now());
        Ok(())
    }
}
