use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::get_api_key;
use crate::error::{AppError, AuthError, ValidationError};
use crate::state::AppState;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaWebhookRequest {
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. The key is checked before the
/// body is read. Events other than `user.upgraded` are acknowledged and
/// ignored.
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let key = get_api_key(req.headers())?;
    if !keys_match(&key, &state.polka_key) {
        return Err(AppError::Auth(AuthError::Unauthorized));
    }

    let body: PolkaWebhookRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(ValidationError::InvalidFormat(e.to_string())))?;

    if body.event != USER_UPGRADED {
        tracing::debug!(event = %body.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    state
        .sessions
        .users()
        .upgrade_to_chirpy_red(body.data.user_id)
        .await?;

    tracing::info!(user_id = %body.data.user_id, "User upgraded to Chirpy Red");
    Ok(HttpResponse::NoContent().finish())
}

/// Compare two secrets without short-circuiting on the first differing byte.
///
/// Both sides are digested first so the loop length never depends on the
/// presented key.
fn keys_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
