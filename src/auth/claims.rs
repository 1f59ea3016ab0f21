/// JWT Claims structure
///
/// Represents the payload of an access token: the account identity plus the
/// standard registered claims (RFC 7519).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer tag stamped into every access token this service mints
pub const TOKEN_ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims for `user_id`, valid from `issued_at` for `lifetime`
    pub fn new(user_id: Uuid, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: user_id.to_string(),
            exp: iat + lifetime.num_seconds(),
            iat,
            iss: TOKEN_ISSUER.to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `Malformed` if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::Malformed)
    }

    /// A token stays valid up to and including its `exp` second
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}
