/// Session Routes
///
/// Login, token refresh and token revocation. Refresh and revoke take the
/// refresh token through the same `Authorization: Bearer` header as every
/// other credential.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::get_bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus both tokens
#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response: a new access token only
#[derive(Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
/// - 500/503: store or signing failure
pub async fn login(
    form: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: session.user.id,
        created_at: session.user.created_at,
        updated_at: session.user.updated_at,
        email: session.user.email,
        is_chirpy_red: session.user.is_chirpy_red,
        token: session.access_token,
        refresh_token: session.refresh_token.token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token stays
/// valid afterwards.
///
/// # Errors
/// - 401: missing header, or unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;
    let token = state.sessions.refresh(&refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. Responds 204 with no body.
///
/// # Errors
/// - 401: missing header or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;
    state.sessions.revoke(&refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
