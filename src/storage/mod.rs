/// Persistence layer
///
/// `Storage` is the single persistence collaborator used by the auth core and the
/// HTTP handlers. Backends:
/// - `PgStorage`: Postgres through sqlx
/// - `MemoryStorage`: process-local maps, used by tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Account, Chirp, RefreshTokenRecord};

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Storage: Send + Sync {
    // Accounts

    /// Fails with `Conflict` when the email is already taken
    async fn insert_account(&self, account: &Account) -> Result<()>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>>;
    /// Replace email and credential hash; `None` if the account does not exist
    async fn update_account_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Account>>;
    /// Remove every account together with its chirps and refresh tokens
    async fn delete_all_accounts(&self) -> Result<u64>;

    // Refresh tokens

    /// Revoke every live token of `record.user_id` and insert `record`, as one
    /// atomic unit. Returns how many tokens were revoked.
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<u64>;
    /// Lookup by stored token key, ignoring revoked rows. Expiry is left to the caller.
    async fn find_non_revoked_refresh_token(&self, token: &str)
        -> Result<Option<RefreshTokenRecord>>;
    /// Revoke every not-yet-revoked token of `user_id`. Returns how many changed.
    async fn revoke_refresh_tokens_for_account(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64>;

    // Chirps

    async fn insert_chirp(&self, chirp: &Chirp) -> Result<()>;
    /// All chirps, oldest first
    async fn list_chirps(&self) -> Result<Vec<Chirp>>;
    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>>;
    /// `false` if there was nothing to delete
    async fn delete_chirp(&self, id: Uuid) -> Result<bool>;
}
