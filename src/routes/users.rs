use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, AuthenticatedUser};
use crate::clock::Clock;
use crate::error::{AppError, StoreError};
use crate::models::Account;
use crate::storage::Storage;
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account; the credential hash never leaves the server
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            created_at: account.created_at,
            updated_at: account.updated_at,
            email: account.email.clone(),
            is_chirpy_red: account.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email, empty or over-long password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    storage: web::Data<dyn Storage>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let account = Account::new(form.email.clone(), hashed_password, clock.now());
    storage.insert_account(&account).await?;

    tracing::info!(user_id = %account.id, "User registered successfully");

    Ok(HttpResponse::Created().json(UserResponse::from(&account)))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password.
/// **Requires valid JWT access token** in Authorization header.
pub async fn update_user(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<CredentialsRequest>,
    storage: web::Data<dyn Storage>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let account = storage
        .update_account_credentials(user.user_id, &form.email, &hashed_password, clock.now())
        .await?
        .ok_or_else(|| StoreError::NotFound("user".to_string()))?;

    tracing::info!(user_id = %account.id, "User credentials updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(&account)))
}
