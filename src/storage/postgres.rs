use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Account, Chirp, RefreshTokenRecord};
use crate::storage::{Result, Storage};

/// Postgres-backed storage
///
/// Schema lives in `migrations/`. A partial unique index on
/// `refresh_tokens(user_id) WHERE revoked_at IS NULL` backs the one-live-token rule.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn insert_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, created_at, updated_at, email, hashed_password, is_chirpy_red)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(&account.email)
        .bind(&account.hashed_password)
        .bind(account.is_chirpy_red)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, created_at, updated_at, email, hashed_password, is_chirpy_red
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, created_at, updated_at, email, hashed_password, is_chirpy_red
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn update_account_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, created_at, updated_at, email, hashed_password, is_chirpy_red
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn delete_all_accounts(&self) -> Result<u64> {
        // chirps and refresh_tokens cascade
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent rotations for the same account on its row lock
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(record.user_id)
            .fetch_one(&mut tx)
            .await?;

        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, updated_at = $2
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(record.user_id)
        .bind(record.created_at)
        .execute(&mut tx)
        .await?
        .rows_affected();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;

        Ok(revoked)
    }

    async fn find_non_revoked_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke_refresh_tokens_for_account(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, updated_at = $2
            WHERE user_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_chirp(&self, chirp: &Chirp) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(chirp.id)
        .bind(chirp.created_at)
        .bind(chirp.updated_at)
        .bind(&chirp.body)
        .bind(chirp.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>> {
        let chirps = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(chirps)
    }

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
