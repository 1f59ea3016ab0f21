/// Authentication module
///
/// Handles password hashing, access token generation/validation,
/// refresh token management, the session lifecycle and request authorization.

mod authorizer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use authorizer::ensure_owner;
pub use authorizer::get_bearer_token;
pub use authorizer::AuthenticatedUser;
pub use authorizer::RequestAuthorizer;
pub use claims::Claims;
pub use claims::TOKEN_ISSUER;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use password::MAX_PASSWORD_BYTES;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::ActiveRefreshToken;
pub use refresh_token::RefreshTokenStore;
pub use session::LoginOutcome;
pub use session::SessionService;
