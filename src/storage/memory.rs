use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Account, Chirp, RefreshTokenRecord};
use crate::storage::{Result, Storage};

#[derive(Default)]
struct StorageData {
    accounts: HashMap<Uuid, Account>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>, // token digest -> record
    chirps: HashMap<Uuid, Chirp>,
}

/// In-memory storage
///
/// One lock guards all tables, so every trait method is atomic with respect to the
/// others. Token rotation relies on this.
#[derive(Default)]
pub struct MemoryStorage {
    data: TokioMutex<StorageData>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-revoked refresh tokens held for `user_id`
    pub async fn count_non_revoked_refresh_tokens(&self, user_id: Uuid) -> usize {
        let data = self.data.lock().await;
        data.refresh_tokens
            .values()
            .filter(|t| t.user_id == user_id && !t.is_revoked())
            .count()
    }
}

fn revoke_live_tokens(data: &mut StorageData, user_id: Uuid, now: DateTime<Utc>) -> u64 {
    let mut revoked = 0;
    for token in data.refresh_tokens.values_mut() {
        if token.user_id == user_id && token.revoked_at.is_none() {
            token.revoked_at = Some(now);
            token.updated_at = now;
            revoked += 1;
        }
    }
    revoked
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert_account(&self, account: &Account) -> Result<()> {
        let mut data = self.data.lock().await;
        if data.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        data.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        Ok(data.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let data = self.data.lock().await;
        Ok(data.accounts.get(&id).cloned())
    }

    async fn update_account_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let mut data = self.data.lock().await;
        if data.accounts.values().any(|a| a.email == email && a.id != id) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        Ok(data.accounts.get_mut(&id).map(|account| {
            account.email = email.to_string();
            account.hashed_password = hashed_password.to_string();
            account.updated_at = updated_at;
            account.clone()
        }))
    }

    async fn delete_all_accounts(&self) -> Result<u64> {
        let mut data = self.data.lock().await;
        let removed = data.accounts.len() as u64;
        data.accounts.clear();
        data.refresh_tokens.clear();
        data.chirps.clear();
        Ok(removed)
    }

    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<u64> {
        let mut data = self.data.lock().await;
        if !data.accounts.contains_key(&record.user_id) {
            return Err(StoreError::NotFound("account".to_string()));
        }
        if data.refresh_tokens.contains_key(&record.token) {
            return Err(StoreError::Conflict("refresh_tokens_pkey".to_string()));
        }
        let revoked = revoke_live_tokens(&mut data, record.user_id, record.created_at);
        data.refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(revoked)
    }

    async fn find_non_revoked_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>> {
        let data = self.data.lock().await;
        Ok(data
            .refresh_tokens
            .get(token)
            .filter(|t| !t.is_revoked())
            .cloned())
    }

    async fn revoke_refresh_tokens_for_account(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let mut data = self.data.lock().await;
        Ok(revoke_live_tokens(&mut data, user_id, now))
    }

    async fn insert_chirp(&self, chirp: &Chirp) -> Result<()> {
        let mut data = self.data.lock().await;
        if !data.accounts.contains_key(&chirp.user_id) {
            return Err(StoreError::NotFound("account".to_string()));
        }
        data.chirps.insert(chirp.id, chirp.clone());
        Ok(())
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>> {
        let data = self.data.lock().await;
        let mut chirps: Vec<Chirp> = data.chirps.values().cloned().collect();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        let data = self.data.lock().await;
        Ok(data.chirps.get(&id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool> {
        let mut data = self.data.lock().await;
        Ok(data.chirps.remove(&id).is_some())
    }
}
