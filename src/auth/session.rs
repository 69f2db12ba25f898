/// Session Orchestration
///
/// Login, refresh and revoke on top of the password vault, the access token
/// codec and the refresh token store.
///
/// A refresh token moves from Active to either Expired or Revoked and never
/// comes back. Access tokens are never stored and never revoked; they simply
/// run out after an hour.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::auth::jwt::{make_jwt, validate_jwt};
use crate::auth::password::{check_password, check_password_against_dummy, hash_password};
use crate::auth::refresh_token::RefreshToken;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::{RefreshTokenStore, User, UserStore};

/// Lifetime of every access token
pub fn access_token_lifetime() -> Duration {
    Duration::hours(1)
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    secret: String,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            secret: secret.into(),
        }
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Verify a password login and open a new session
    ///
    /// # Errors
    /// - `Unauthorized` for an unknown email or a wrong password, without
    ///   saying which
    /// - store and signing failures pass through as internal errors
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = match self.users.get_by_email(email).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                check_password_against_dummy(password);
                tracing::info!("Login rejected: unknown account");
                return Err(AppError::Auth(AuthError::Unauthorized));
            }
            Err(e) => return Err(e),
        };

        check_password(password, &user.hashed_password).map_err(|e| {
            if e.is_auth() {
                tracing::info!(user_id = %user.id, "Login rejected: password mismatch");
                AppError::Auth(AuthError::Unauthorized)
            } else {
                e
            }
        })?;

        let access_token = make_jwt(user.id, &self.secret, access_token_lifetime())?;
        let refresh_token = self.refresh_tokens.create(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in successfully");

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token is left exactly as it was.
    ///
    /// # Errors
    /// `Unauthorized` if the token is unknown, revoked or expired
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let record = self
            .refresh_tokens
            .get(refresh_token)
            .await
            .map_err(not_found_is_unauthorized)?;

        if record.is_revoked() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(AppError::Auth(AuthError::Unauthorized));
        }

        if !record.is_usable() {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(AppError::Auth(AuthError::Unauthorized));
        }

        let access_token = make_jwt(record.user_id, &self.secret, access_token_lifetime())?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Permanently revoke a refresh token
    ///
    /// # Errors
    /// `Unauthorized` if the token was never issued
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.refresh_tokens
            .revoke(refresh_token)
            .await
            .map_err(not_found_is_unauthorized)?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Resolve an access token to the user it was issued for
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AppError> {
        validate_jwt(access_token, &self.secret)
    }

    /// Create an account, storing only the password hash
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        require_credentials(email, password)?;

        let hashed_password = hash_password(password)?;
        let user = self.users.create(email, &hashed_password).await?;

        tracing::info!(user_id = %user.id, "User registered successfully");
        Ok(user)
    }

    /// Replace an account's email and password
    pub async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        require_credentials(email, password)?;

        let hashed_password = hash_password(password)?;
        let user = self.users.update(user_id, email, &hashed_password).await?;

        tracing::info!(user_id = %user.id, "User credentials updated");
        Ok(user)
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()).into());
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()).into());
    }
    Ok(())
}

/// Store misses must not tell the caller whether a token ever existed
fn not_found_is_unauthorized(e: AppError) -> AppError {
    if e.is_not_found() {
        AppError::Auth(AuthError::Unauthorized)
    } else {
        e
    }
}
