/// Request authorization
///
/// Pulls the bearer credential out of the `Authorization` header, validates it as an
/// access token and yields the account id. Resource handlers then use
/// `ensure_owner` for mutating operations.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::validate_access_token;
use crate::clock::Clock;
use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity attached to a request by `JwtMiddleware`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Extract the bearer token from request headers
///
/// The header must be exactly `Bearer` followed by a single space and a non-empty
/// token without further whitespace.
///
/// # Errors
/// Returns `MissingToken` for an absent, non-UTF-8 or differently shaped header
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => Ok(token),
        _ => Err(AuthError::MissingToken),
    }
}

/// Mutations require the caller to own the resource
///
/// # Errors
/// Returns `Forbidden` when `owner_id` differs from the authorized account
pub fn ensure_owner(owner_id: Uuid, user: &AuthenticatedUser) -> Result<(), AuthError> {
    if owner_id == user.user_id {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %user.user_id,
            owner_id = %owner_id,
            "Rejected mutation of a resource owned by another account"
        );
        Err(AuthError::Forbidden)
    }
}

#[derive(Clone)]
pub struct RequestAuthorizer {
    secret: String,
    clock: Arc<dyn Clock>,
}

impl RequestAuthorizer {
    pub fn new(secret: String, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// Authorize a request from its headers
    ///
    /// # Errors
    /// `MissingToken`, or whatever access-token validation reports
    /// (`Malformed`, `BadSignature`, `Expired`)
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let token = get_bearer_token(headers)?;
        let user_id = validate_access_token(token, &self.secret, self.clock.as_ref())?;
        Ok(AuthenticatedUser { user_id })
    }
}
