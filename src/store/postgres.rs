/// Postgres-backed stores
///
/// Expected tables:
/// - `users (id UUID PK, email TEXT UNIQUE, hashed_password TEXT,
///   is_chirpy_red BOOL, created_at TIMESTAMPTZ, updated_at TIMESTAMPTZ)`
/// - `refresh_tokens (token_hash TEXT PK, user_id UUID REFERENCES users,
///   created_at, updated_at, expires_at TIMESTAMPTZ, revoked_at TIMESTAMPTZ NULL)`
///
/// Refresh tokens are stored as SHA-256 hashes, never in plaintext.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RefreshTokenStore, User, UserStore};
use crate::auth::{default_refresh_token_lifetime, hash_token, RefreshToken};
use crate::error::{AppError, StoreError};

type UserRow = (Uuid, String, String, bool, DateTime<Utc>, DateTime<Utc>);

/// Only the first revocation stamps `revoked_at` and `updated_at`; `SET`
/// expressions read the row as it was before the update.
const REVOKE_REFRESH_TOKEN: &str = r#"
    UPDATE refresh_tokens
    SET revoked_at = COALESCE(revoked_at, $1),
        updated_at = CASE WHEN revoked_at IS NULL THEN $1 ELSE updated_at END
    WHERE token_hash = $2
"#;

fn user_from_row(row: UserRow) -> User {
    let (id, email, hashed_password, is_chirpy_red, created_at, updated_at) = row;
    User {
        id,
        email,
        hashed_password,
        is_chirpy_red,
        created_at,
        updated_at,
    }
}

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Store(StoreError::NotFound))?;

        Ok(user_from_row(row))
    }

    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, hashed_password, is_chirpy_red, created_at, updated_at)
            VALUES ($1, $2, $3, false, $4, $4)
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(row))
    }

    async fn update(&self, id: Uuid, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Store(StoreError::NotFound))?;

        Ok(user_from_row(row))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET is_chirpy_red = true, updated_at = $2
            WHERE id = $1
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Store(StoreError::NotFound))?;

        Ok(user_from_row(row))
    }
}

#[derive(Clone)]
pub struct PostgresRefreshTokenStore {
    pool: PgPool,
    lifetime: Duration,
}

impl PostgresRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lifetime: default_refresh_token_lifetime(),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn create(&self, user_id: Uuid) -> Result<RefreshToken, AppError> {
        let token = RefreshToken::issue(user_id, self.lifetime);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(hash_token(&token.token))
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<RefreshToken, AppError> {
        let (user_id, created_at, updated_at, expires_at, revoked_at) = sqlx::query_as::<
            _,
            (Uuid, DateTime<Utc>, DateTime<Utc>, DateTime<Utc>, Option<DateTime<Utc>>),
        >(
            r#"
            SELECT user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::Store(StoreError::NotFound))?;

        Ok(RefreshToken {
            token: token.to_string(),
            user_id,
            created_at,
            updated_at,
            expires_at,
            revoked_at,
        })
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let result = sqlx::query(REVOKE_REFRESH_TOKEN)
            .bind(Utc::now())
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Store(StoreError::NotFound));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_only_stamps_unrevoked_rows() {
        let sql: String = REVOKE_REFRESH_TOKEN.split_whitespace().collect::<Vec<_>>().join(" ");

        assert!(sql.contains("revoked_at = COALESCE(revoked_at, $1)"));
        assert!(sql.contains("updated_at = CASE WHEN revoked_at IS NULL THEN $1 ELSE updated_at END"));
        assert!(!sql.contains("updated_at = $1"));
    }
}
