/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs carrying the account id. They are never
/// persisted; every protected request re-validates them. Rotating the secret
/// invalidates every token issued under the previous one.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TOKEN_ISSUER};
use crate::clock::Clock;
use crate::error::{AppError, AuthError};

/// Generate a new access token for a user
///
/// # Arguments
/// * `user_id` - Account the token identifies
/// * `secret` - Server-held signing secret
/// * `lifetime` - How long the token stays valid from now
/// * `clock` - Source of the issued-at time
///
/// # Errors
/// Returns error if token encoding fails
pub fn generate_access_token(
    user_id: &Uuid,
    secret: &str,
    lifetime: Duration,
    clock: &dyn Clock,
) -> Result<String, AppError> {
    let claims = Claims::new(*user_id, clock.now(), lifetime);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return the account id it carries
///
/// Expiry is checked against `clock` rather than the library's wall-clock check so
/// tests can drive time.
///
/// # Errors
/// - `BadSignature` if the signature does not match `secret`
/// - `Expired` if the clock is past the token's `exp`
/// - `Malformed` for anything that cannot be decoded or carries a foreign issuer
pub fn validate_access_token(
    token: &str,
    secret: &str,
    clock: &dyn Clock,
) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let reason = match e.kind() {
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed,
        };
        tracing::warn!(error = %e, "JWT validation error");
        reason
    })?;

    if claims.is_expired_at(clock.now()) {
        tracing::info!(user_id = %claims.sub, "Access token expired");
        return Err(AuthError::Expired);
    }

    claims.user_id()
}
