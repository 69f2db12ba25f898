/// Application Error Handling
///
/// One error type for the whole service, built from small domain enums:
/// 1. Authentication errors (credentials are wrong, never a crash)
/// 2. Store errors (persistence collaborator misses and outages)
/// 3. Validation errors (request bodies)
/// 4. Crypto primitive errors (hashing, signing)
///
/// "Credentials are wrong" and "the system is broken" stay distinguishable in
/// the logs even where both end up as a generic HTTP response.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Authentication and authorization failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one
    MissingAuth,
    /// `Authorization` header present without the expected scheme prefix
    MalformedAuth,
    /// Password did not verify (wrong, empty, or corrupt hash)
    PasswordMismatch,
    /// Access token malformed, forged, expired, or from another issuer
    InvalidToken,
    /// Session-level rejection: bad login, unusable or unknown refresh token
    Unauthorized,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingAuth => write!(f, "No auth token in request"),
            AuthError::MalformedAuth => write!(f, "Invalid token format in authorization header"),
            AuthError::PasswordMismatch => write!(f, "Password does not match"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
            AuthError::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl StdError for AuthError {}

/// Persistence collaborator errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    UniqueViolation(String),
    Unavailable(String),
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Record not found"),
            StoreError::UniqueViolation(msg) => write!(f, "Duplicate entry: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            StoreError::Query(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// Request body validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(String),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::InvalidFormat(msg) => write!(f, "Invalid request body: {}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Store(StoreError),
    Validation(ValidationError),
    /// The password hashing primitive rejected its input
    Hashing(String),
    /// The token signing primitive failed
    Signing(String),
}

impl AppError {
    /// True for the "credentials are wrong" class of failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }

    /// True when the store reported a miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Store(StoreError::NotFound))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "Password hashing failed: {}", msg),
            AppError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::Store(StoreError::NotFound),
            sqlx::Error::Database(db_err) => {
                // 23505 = unique_violation
                if db_err.code().as_deref() == Some("23505") {
                    AppError::Store(StoreError::UniqueViolation(db_err.message().to_string()))
                } else {
                    AppError::Store(StoreError::Query(db_err.message().to_string()))
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Store(StoreError::Unavailable(err.to_string()))
            }
            other => AppError::Store(StoreError::Query(other.to_string())),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also present in the log line
    pub error_id: String,
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (code, message) = match self {
            AppError::Auth(e) => match e {
                AuthError::MissingAuth => ("MISSING_TOKEN", e.to_string()),
                AuthError::MalformedAuth => ("MALFORMED_TOKEN", e.to_string()),
                AuthError::InvalidToken => ("TOKEN_INVALID", e.to_string()),
                // Login failures never say which half of the credential was wrong
                AuthError::PasswordMismatch | AuthError::Unauthorized => {
                    ("UNAUTHORIZED", "Incorrect email or password".to_string())
                }
            },

            AppError::Store(e) => match e {
                StoreError::NotFound => ("NOT_FOUND", e.to_string()),
                StoreError::UniqueViolation(_) => {
                    ("DUPLICATE_ENTRY", "Email already registered".to_string())
                }
                StoreError::Unavailable(_) => (
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                StoreError::Query(_) => ("DATABASE_ERROR", "Database error occurred".to_string()),
            },

            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),

            AppError::Hashing(_) | AppError::Signing(_) => {
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        let status = ResponseError::status_code(self);
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Auth(e) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %e,
                    "Authentication rejected"
                );
            }
            AppError::Validation(e) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %e,
                    "Validation error"
                );
            }
            AppError::Store(StoreError::NotFound) | AppError::Store(StoreError::UniqueViolation(_)) => {
                tracing::warn!(
                    request_id = request_id,
                    error = %self,
                    "Store lookup failed"
                );
            }
            AppError::Store(e) => {
                tracing::error!(
                    request_id = request_id,
                    error = %e,
                    "Store failure"
                );
            }
            AppError::Hashing(_) | AppError::Signing(_) => {
                tracing::error!(
                    request_id = request_id,
                    error = %self,
                    "Crypto primitive failure"
                );
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Store(e) => match e {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::UniqueViolation(_) => StatusCode::CONFLICT,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Hashing(_) | AppError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_unauthorized() {
        let errors = vec![
            AuthError::MissingAuth,
            AuthError::MalformedAuth,
            AuthError::PasswordMismatch,
            AuthError::InvalidToken,
            AuthError::Unauthorized,
        ];

        for e in errors {
            let app_err: AppError = e.into();
            assert!(app_err.is_auth());
            assert_eq!(ResponseError::status_code(&app_err), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Hashing("password exceeds 72 bytes".to_string());
        let (status, body) = <AppError as ErrorHandler>::error_response(&err, "req-1");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("72"));
    }

    #[test]
    fn test_login_failures_share_one_message() {
        let mismatch = AppError::Auth(AuthError::PasswordMismatch);
        let unauthorized = AppError::Auth(AuthError::Unauthorized);

        let (_, a) = <AppError as ErrorHandler>::error_response(&mismatch, "a");
        let (_, b) = <AppError as ErrorHandler>::error_response(&unauthorized, "b");

        assert_eq!(a.message, b.message);
        assert_eq!(a.code, b.code);
    }

    #[test]
    fn test_store_error_status_codes() {
        assert_eq!(
            ResponseError::status_code(&AppError::Store(StoreError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ResponseError::status_code(&AppError::Store(StoreError::UniqueViolation("x".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ResponseError::status_code(&AppError::Store(StoreError::Unavailable("down".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let err = AppError::Validation(ValidationError::InvalidFormat("expected value".into()));
        let (status, body) = <AppError as ErrorHandler>::error_response(&err, "req-2");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_error_response_creation() {
        let response = ErrorResponse::new(
            "test-123".to_string(),
            "Test error".to_string(),
            "TEST_ERROR".to_string(),
            400,
        );

        assert_eq!(response.error_id, "test-123");
        assert_eq!(response.code, "TEST_ERROR");
        assert_eq!(response.status, 400);
    }
}
