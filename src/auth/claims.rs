/// JWT Claims structure
///
/// Payload of an access token: RFC 7519 registered claims only.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Issuer stamped on every access token this service mints
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token ID, so two tokens minted in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Create claims for `user_id` that expire `expires_in` from now
    ///
    /// `exp` is rounded up to the next whole second, so any positive
    /// lifetime yields a token that is valid right after issuance.
    pub fn new(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expires = now + expires_in;
        let exp = expires.timestamp() + i64::from(expires.timestamp_subsec_nanos() > 0);

        Self {
            sub: user_id.to_string(),
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `InvalidToken` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::InvalidToken))
    }

    /// Expiry is a hard boundary: a token is dead at `exp`, not after it
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}
