/// Refresh Token Model
///
/// Refresh tokens are:
/// - Cryptographically secure random 64-character alphanumeric strings
/// - Owned by exactly one user
/// - Usable only while unrevoked and unexpired
/// - Never rotated: refreshing mints an access token and leaves this one alone
///
/// Persistence lives behind `store::RefreshTokenStore`.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Default lifetime of a refresh token
pub fn default_refresh_token_lifetime() -> Duration {
    Duration::days(60)
}

/// A persisted refresh token
#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Mint a fresh, unrevoked token for `user_id`
    pub fn issue(user_id: Uuid, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: generate_refresh_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + lifetime,
            revoked_at: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable iff never revoked and `now` is strictly before expiry
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// Mark revoked. A token that is already revoked keeps its first timestamp.
    pub fn revoke_at(&mut self, now: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(now);
            self.updated_at = now;
        }
    }
}

/// Generate a new cryptographically secure refresh token
///
/// The alphabet has no `.`, so a refresh token can never look like a JWT.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// SHA-256 of a refresh token, hex encoded
///
/// Stores keep this instead of the plaintext token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
