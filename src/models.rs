/// Persisted records shared by the storage backends and the services.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered account
///
/// `hashed_password` is opaque outside of `auth::password` and is never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

impl Account {
    pub fn new(email: String, hashed_password: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email,
            hashed_password,
            is_chirpy_red: false,
        }
    }
}

/// Stored refresh token
///
/// `token` holds the SHA-256 digest of the string handed to the client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Active means not revoked and strictly before its expiry
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && now < self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}
