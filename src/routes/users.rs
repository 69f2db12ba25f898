/// Account Routes
///
/// Creating an account and changing its credentials. These are the only
/// places besides login that touch the password vault.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use crate::store::User;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account; never carries the password hash
#[derive(Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: empty email or password
/// - 409: email already registered
/// - 500: password could not be hashed
pub async fn register(
    form: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.sessions.register(&form.email, &form.password).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// **Requires a valid access token**; the account updated is the token's
/// subject.
pub async fn update_user(
    caller: web::ReqData<AuthenticatedUser>,
    form: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .sessions
        .update_credentials(caller.user_id, &form.email, &form.password)
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
