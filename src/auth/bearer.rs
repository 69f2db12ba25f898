/// Authorization header parsing
///
/// Extraction is type-agnostic: the same bearer string may be an access token
/// or a refresh token, and the caller decides which validator applies.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::{AppError, AuthError};

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`
///
/// `"Bearer "` with nothing after it yields an empty string; it is up to
/// whoever consumes the token to reject it.
///
/// # Errors
/// - `MissingAuth` if the header is absent or empty
/// - `MalformedAuth` if it does not start with `"Bearer "`
pub fn get_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    extract_with_prefix(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>` (payment webhook only)
pub fn get_api_key(headers: &HeaderMap) -> Result<String, AppError> {
    extract_with_prefix(headers, API_KEY_PREFIX)
}

fn extract_with_prefix(headers: &HeaderMap, prefix: &str) -> Result<String, AppError> {
    let value = match headers.get(AUTHORIZATION) {
        None => return Err(AppError::Auth(AuthError::MissingAuth)),
        Some(v) if v.is_empty() => return Err(AppError::Auth(AuthError::MissingAuth)),
        Some(v) => v
            .to_str()
            .map_err(|_| AppError::Auth(AuthError::MalformedAuth))?,
    };

    value
        .strip_prefix(prefix)
        .map(str::to_string)
        .ok_or(AppError::Auth(AuthError::MalformedAuth))
}
