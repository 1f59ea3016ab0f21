/// Refresh Token Management
///
/// Handles refresh token generation, storage, lookup, and revocation.
/// Refresh tokens are:
/// - Cryptographically secure random 64-character alphanumeric strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Valid for 60 days unless revoked
/// - Limited to one live token per account: issuing revokes the previous ones

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AuthError};
use crate::models::RefreshTokenRecord;
use crate::storage::Storage;

const TOKEN_LENGTH: usize = 64;

/// Generate a new cryptographically secure refresh token
///
/// 64 characters drawn from a 62-symbol alphabet, roughly 381 bits.
/// The token is returned in plaintext (this is what the client stores).
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a refresh token using SHA-256
///
/// This digest is the storage key. Never store plaintext tokens in the database.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A refresh token that passed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRefreshToken {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl RefreshTokenStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, lifetime: Duration) -> Self {
        Self {
            storage,
            clock,
            lifetime,
        }
    }

    /// Issue a new refresh token for `user_id`
    ///
    /// Every other live token of the account is revoked in the same storage
    /// operation, so concurrent logins never leave two live tokens behind.
    ///
    /// # Errors
    /// Returns error if the storage operation fails
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = generate_refresh_token();
        let now = self.clock.now();
        let record = RefreshTokenRecord {
            token: hash_token(&token),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.lifetime,
            revoked_at: None,
        };

        let revoked = self.storage.insert_refresh_token(&record).await?;

        tracing::info!(
            user_id = %user_id,
            revoked_previous = revoked,
            "Refresh token issued"
        );
        Ok(token)
    }

    /// Look up a live refresh token
    ///
    /// Unknown, revoked and expired tokens are all reported the same way so the
    /// caller learns nothing about which one it was.
    ///
    /// # Errors
    /// - `Unauthorized` if the token is not live
    /// - Storage errors are propagated
    pub async fn lookup(&self, token: &str) -> Result<ActiveRefreshToken, AppError> {
        let record = self
            .storage
            .find_non_revoked_refresh_token(&hash_token(token))
            .await?;

        match record {
            None => {
                tracing::warn!("Refresh token not found or revoked");
                Err(AuthError::Unauthorized.into())
            }
            Some(record) if !record.is_active_at(self.clock.now()) => {
                tracing::info!(user_id = %record.user_id, "Refresh token expired");
                Err(AuthError::Unauthorized.into())
            }
            Some(record) => Ok(ActiveRefreshToken {
                user_id: record.user_id,
                expires_at: record.expires_at,
            }),
        }
    }

    /// Revoke all refresh tokens for a user
    ///
    /// Idempotent: revoking an already revoked set changes nothing.
    ///
    /// # Errors
    /// Returns error if the storage operation fails
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        let revoked = self
            .storage
            .revoke_refresh_tokens_for_account(user_id, self.clock.now())
            .await?;

        tracing::info!(user_id = %user_id, revoked = revoked, "Refresh tokens revoked for user");
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::models::Account;
    use crate::storage::MemoryStorage;

    struct Fixture {
        storage: Arc<MemoryStorage>,
        clock: Arc<MockClock>,
        store: RefreshTokenStore,
        user_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(MockClock::new(Utc::now()));
        let account = Account::new("a@example.com".to_string(), "hash".to_string(), clock.now());
        storage.insert_account(&account).await.unwrap();
        let store = RefreshTokenStore::new(storage.clone(), clock.clone(), Duration::days(60));

        Fixture {
            storage,
            clock,
            store,
            user_id: account.id,
        }
    }

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token();

        // Token should be 64 characters
        assert_eq!(token.len(), 64);
        // Token should be alphanumeric
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_token_hashing() {
        let token = generate_refresh_token();
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        // Same token should produce same hash
        assert_eq!(hash1, hash2);
        // Hash should not equal plaintext
        assert_ne!(token, hash1);
        // Hash should be 64 chars (SHA-256 hex)
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        let hash1 = hash_token(&generate_refresh_token());
        let hash2 = hash_token(&generate_refresh_token());

        assert_ne!(hash1, hash2);
    }

    #[tokio::test]
    async fn test_issue_then_lookup() {
        let f = fixture().await;

        let token = f.store.issue(f.user_id).await.unwrap();
        let active = f.store.lookup(&token).await.unwrap();

        assert_eq!(active.user_id, f.user_id);
        assert_eq!(active.expires_at, f.clock.now() + Duration::days(60));
    }

    #[tokio::test]
    async fn test_plaintext_is_not_the_storage_key() {
        let f = fixture().await;

        let token = f.store.issue(f.user_id).await.unwrap();

        assert!(f
            .storage
            .find_non_revoked_refresh_token(&token)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_second_issue_revokes_first() {
        let f = fixture().await;

        let first = f.store.issue(f.user_id).await.unwrap();
        let second = f.store.issue(f.user_id).await.unwrap();

        assert_eq!(
            f.store.lookup(&first).await.unwrap_err().as_auth(),
            Some(AuthError::Unauthorized)
        );
        assert_eq!(f.store.lookup(&second).await.unwrap().user_id, f.user_id);
        assert_eq!(f.storage.count_non_revoked_refresh_tokens(f.user_id).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let f = fixture().await;

        let err = f.store.lookup("not-a-real-token").await.unwrap_err();

        assert_eq!(err.as_auth(), Some(AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_expired_token_is_not_found() {
        let f = fixture().await;
        let token = f.store.issue(f.user_id).await.unwrap();

        f.clock.advance(Duration::days(60) + Duration::seconds(1));

        assert_eq!(
            f.store.lookup(&token).await.unwrap_err().as_auth(),
            Some(AuthError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_token_valid_just_before_expiry() {
        let f = fixture().await;
        let token = f.store.issue(f.user_id).await.unwrap();

        f.clock.advance(Duration::days(60) - Duration::seconds(1));

        assert!(f.store.lookup(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_all_is_idempotent() {
        let f = fixture().await;
        let token = f.store.issue(f.user_id).await.unwrap();

        assert_eq!(f.store.revoke_all(f.user_id).await.unwrap(), 1);
        assert_eq!(f.store.revoke_all(f.user_id).await.unwrap(), 0);

        assert!(f.store.lookup(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_issue_leaves_one_live_token() {
        let f = fixture().await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = f.store.clone();
            let user_id = f.user_id;
            handles.push(tokio::spawn(async move { store.issue(user_id).await }));
        }
        let mut tokens = Vec::new();
        for handle in handles {
            tokens.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(f.storage.count_non_revoked_refresh_tokens(f.user_id).await, 1);
        let mut live = 0;
        for token in &tokens {
            if f.store.lookup(token).await.is_ok() {
                live += 1;
            }
        }
        assert_eq!(live, 1);
    }

    #[tokio::test]
    async fn test_issue_for_unknown_account_fails() {
        let f = fixture().await;

        assert!(f.store.issue(Uuid::new_v4()).await.is_err());
    }
}
