/// Authentication module
///
/// Password hashing, access token (JWT) minting and validation, bearer
/// header parsing, refresh tokens, and the session flows built on them.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::get_api_key;
pub use bearer::get_bearer_token;
pub use claims::{Claims, ACCESS_TOKEN_ISSUER};
pub use jwt::make_jwt;
pub use jwt::validate_jwt;
pub use password::check_password;
pub use password::hash_password;
pub use refresh_token::{default_refresh_token_lifetime, generate_refresh_token, hash_token, RefreshToken};
pub use session::{access_token_lifetime, Session, SessionManager};
