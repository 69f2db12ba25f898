/// JWT Token Generation and Validation
///
/// Access tokens are HS256 JWTs. They are never stored: signature, issuer and
/// expiry decide validity on their own.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ACCESS_TOKEN_ISSUER};
use crate::error::{AppError, AuthError};

/// Create a signed access token for a user
///
/// # Arguments
/// * `user_id` - Subject of the token
/// * `secret` - Shared HMAC secret
/// * `expires_in` - Lifetime from now
///
/// # Errors
/// Returns `AppError::Signing` if encoding fails
pub fn make_jwt(user_id: Uuid, secret: &str, expires_in: Duration) -> Result<String, AppError> {
    let claims = Claims::new(user_id, expires_in);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Signing(e.to_string()))
}

/// Validate an access token and return its subject
///
/// # Errors
/// Every failure (bad structure, bad signature, wrong issuer, expired,
/// unparsable subject) is the same `AuthError::InvalidToken`.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation error: {}", e);
        AppError::Auth(AuthError::InvalidToken)
    })?;

    // jsonwebtoken still accepts a token in the exact second it expires
    if claims.is_expired_at(Utc::now().timestamp()) {
        return Err(AppError::Auth(AuthError::InvalidToken));
    }

    claims.user_id()
}
