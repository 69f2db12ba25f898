mod admin;
mod auth;
mod health_check;
mod users;
mod webhooks;

pub use admin::{metrics, reset};
pub use auth::{login, refresh, revoke, LoginRequest, LoginResponse, RefreshResponse};
pub use health_check::health_check;
pub use users::{register, update_user, CredentialsRequest, UserResponse};
pub use webhooks::{polka_webhook, PolkaWebhookData, PolkaWebhookRequest};
