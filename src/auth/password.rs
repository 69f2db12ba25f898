/// Password Hashing and Verification
///
/// bcrypt-backed one-way hashing. Verification never says *why* it failed.

use std::sync::OnceLock;

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, AuthError};

/// bcrypt only reads the first 72 bytes of its input
const MAX_PASSWORD_BYTES: usize = 72;

const HASH_COST: u32 = if cfg!(test) { 4 } else { DEFAULT_COST };

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AppError::Hashing` if the password is longer than bcrypt accepts
/// or the primitive itself fails. Callers surface this as an internal error.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Hashing(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    hash(password, HASH_COST).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a password against its stored hash
///
/// # Errors
/// Returns `AuthError::PasswordMismatch` for a wrong password, an empty
/// password, or a hash bcrypt cannot parse. The three are not distinguished.
pub fn check_password(password: &str, hashed: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::Auth(AuthError::PasswordMismatch));
    }

    match verify(password, hashed) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::Auth(AuthError::PasswordMismatch)),
        Err(e) => {
            tracing::debug!("Stored password hash could not be parsed: {}", e);
            Err(AppError::Auth(AuthError::PasswordMismatch))
        }
    }
}

/// Burn one verification against a throwaway hash.
///
/// Used when a login names an unknown account so that the response takes
/// about as long as a wrong password would.
pub(crate) fn check_password_against_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| {
        hash("chirpy-dummy-password", HASH_COST).unwrap_or_default()
    });
    let _ = verify(password, dummy);
}
