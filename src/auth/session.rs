/// Session lifecycle: login, access token refresh and logout-everywhere.
///
/// Per account the only observable state is the refresh token table:
/// no live token means anonymous, exactly one live token means authenticated.

use std::sync::Arc;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::auth::refresh_token::RefreshTokenStore;
use crate::clock::Clock;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::models::Account;
use crate::storage::Storage;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionService {
    storage: Arc<dyn Storage>,
    refresh_tokens: RefreshTokenStore,
    jwt: JwtSettings,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, jwt: JwtSettings) -> Self {
        let refresh_tokens =
            RefreshTokenStore::new(storage.clone(), clock.clone(), jwt.refresh_token_lifetime());
        Self {
            storage,
            refresh_tokens,
            jwt,
            clock,
        }
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenStore {
        &self.refresh_tokens
    }

    /// Authenticate with email and password
    ///
    /// Issues an access token and a refresh token. The refresh token replaces any
    /// previous one for the account.
    ///
    /// # Errors
    /// - `InvalidCredentials` for an unknown email or a wrong password, indistinguishably
    /// - Storage and signing failures are propagated
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let account = match self.storage.find_account_by_email(email).await? {
            Some(account) => account,
            None => {
                tracing::warn!("Login rejected: no account for email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(password, &account.hashed_password) {
            tracing::warn!(user_id = %account.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = generate_access_token(
            &account.id,
            &self.jwt.secret,
            self.jwt.access_token_lifetime(),
            self.clock.as_ref(),
        )?;
        let refresh_token = self.refresh_tokens.issue(account.id).await?;

        tracing::info!(user_id = %account.id, "User logged in successfully");

        Ok(LoginOutcome {
            account,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token
    ///
    /// The refresh token itself is not rotated.
    ///
    /// # Errors
    /// - `Unauthorized` if the refresh token is unknown, expired or revoked
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let active = self.refresh_tokens.lookup(refresh_token).await?;

        let access_token = generate_access_token(
            &active.user_id,
            &self.jwt.secret,
            self.jwt.access_token_lifetime(),
            self.clock.as_ref(),
        )?;

        tracing::info!(user_id = %active.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke every session of the account owning `refresh_token`
    ///
    /// # Errors
    /// - `Unauthorized` if the refresh token is unknown, expired or revoked
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        let active = self.refresh_tokens.lookup(refresh_token).await?;
        self.refresh_tokens.revoke_all(active.user_id).await?;

        tracing::info!(user_id = %active.user_id, "User logged out everywhere");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::validate_access_token;
    use crate::auth::password::hash_password;
    use crate::clock::MockClock;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, Utc};

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: SECRET.to_string(),
            access_token_expiry_seconds: 3600,
            refresh_token_expiry_days: 60,
        }
    }

    async fn service_with_alice() -> (SessionService, Arc<MockClock>, Account) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(MockClock::new(Utc::now()));
        let account = Account::new(
            "alice@example.com".to_string(),
            hash_password("Secur3Pass").unwrap(),
            clock.now(),
        );
        storage.insert_account(&account).await.unwrap();
        let service = SessionService::new(storage, clock.clone(), settings());
        (service, clock, account)
    }

    #[tokio::test]
    async fn test_login_returns_distinct_tokens() {
        let (service, clock, alice) = service_with_alice().await;

        let outcome = service.login("alice@example.com", "Secur3Pass").await.unwrap();

        assert_ne!(outcome.access_token, outcome.refresh_token);
        assert_eq!(outcome.account.id, alice.id);
        assert_eq!(
            validate_access_token(&outcome.access_token, SECRET, clock.as_ref()),
            Ok(alice.id)
        );
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_the_same() {
        let (service, _, _) = service_with_alice().await;

        let unknown = service.login("bob@example.com", "Secur3Pass").await.unwrap_err();
        let wrong = service.login("alice@example.com", "wrong").await.unwrap_err();

        assert_eq!(unknown.as_auth(), Some(AuthError::InvalidCredentials));
        assert_eq!(wrong.as_auth(), Some(AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let (service, _, _) = service_with_alice().await;

        let err = service.login("ALICE@example.com", "Secur3Pass").await.unwrap_err();

        assert_eq!(err.as_auth(), Some(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_access_token_without_rotation() {
        let (service, clock, alice) = service_with_alice().await;
        let outcome = service.login("alice@example.com", "Secur3Pass").await.unwrap();

        clock.advance(Duration::seconds(5));
        let first = service.refresh(&outcome.refresh_token).await.unwrap();
        let second = service.refresh(&outcome.refresh_token).await.unwrap();

        assert_eq!(validate_access_token(&first, SECRET, clock.as_ref()), Ok(alice.id));
        assert_eq!(validate_access_token(&second, SECRET, clock.as_ref()), Ok(alice.id));
    }

    #[tokio::test]
    async fn test_access_token_expires_after_an_hour() {
        let (service, clock, _) = service_with_alice().await;
        let outcome = service.login("alice@example.com", "Secur3Pass").await.unwrap();

        clock.advance(Duration::seconds(3601));

        assert_eq!(
            validate_access_token(&outcome.access_token, SECRET, clock.as_ref()),
            Err(AuthError::Expired)
        );
        // the refresh token still mints a fresh one
        let renewed = service.refresh(&outcome.refresh_token).await.unwrap();
        assert!(validate_access_token(&renewed, SECRET, clock.as_ref()).is_ok());
    }

    #[tokio::test]
    async fn test_login_rotation_then_revoke() {
        let (service, _, _) = service_with_alice().await;

        let first = service.login("alice@example.com", "Secur3Pass").await.unwrap();
        let second = service.login("alice@example.com", "Secur3Pass").await.unwrap();

        assert_eq!(
            service.refresh(&first.refresh_token).await.unwrap_err().as_auth(),
            Some(AuthError::Unauthorized)
        );
        assert!(service.refresh(&second.refresh_token).await.is_ok());

        service.revoke(&second.refresh_token).await.unwrap();

        assert_eq!(
            service.refresh(&second.refresh_token).await.unwrap_err().as_auth(),
            Some(AuthError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_revoke_with_dead_token_is_unauthorized() {
        let (service, _, _) = service_with_alice().await;
        let outcome = service.login("alice@example.com", "Secur3Pass").await.unwrap();
        service.revoke(&outcome.refresh_token).await.unwrap();

        let err = service.revoke(&outcome.refresh_token).await.unwrap_err();

        assert_eq!(err.as_auth(), Some(AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_refresh_token_expires_after_sixty_days() {
        let (service, clock, _) = service_with_alice().await;
        let outcome = service.login("alice@example.com", "Secur3Pass").await.unwrap();

        clock.advance(Duration::days(61));

        assert_eq!(
            service.refresh(&outcome.refresh_token).await.unwrap_err().as_auth(),
            Some(AuthError::Unauthorized)
        );
    }
}
