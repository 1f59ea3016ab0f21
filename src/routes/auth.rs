/// Authentication Routes
///
/// Handles login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{get_bearer_token, SessionService};
use crate::routes::users::UserResponse;
use crate::error::AppError;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the account plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Refreshed access token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// Authenticate user with email and password.
/// Returns the user, an access token and a refresh token on success.
///
/// # Errors
/// - 401: Invalid credentials (email not found or wrong password, same body for both)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let outcome = session.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&outcome.account),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Mint a new access token from the refresh token in `Authorization: Bearer <token>`.
/// The refresh token itself stays valid.
///
/// # Errors
/// - 401: Missing header, or refresh token unknown, expired or revoked
pub async fn refresh(
    req: HttpRequest,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;
    let token = session.refresh(refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Log out everywhere: revokes every refresh token of the account owning the
/// presented one.
///
/// # Errors
/// - 401: Missing header, or refresh token unknown, expired or revoked
pub async fn revoke(
    req: HttpRequest,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = get_bearer_token(req.headers())?;
    session.revoke(refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
