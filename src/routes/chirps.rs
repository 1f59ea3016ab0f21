use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{ensure_owner, AuthenticatedUser};
use crate::chirps::clean_chirp_body;
use crate::clock::Clock;
use crate::error::{AppError, StoreError, ValidationError};
use crate::models::Chirp;
use crate::storage::Storage;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct CleanedChirpResponse {
    pub cleaned_body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| ValidationError::InvalidFormat("chirp id".to_string()).into())
}

/// POST /api/validate_chirp
pub async fn validate_chirp(form: web::Json<ChirpRequest>) -> Result<HttpResponse, AppError> {
    let cleaned_body = clean_chirp_body(&form.body)?;
    Ok(HttpResponse::Ok().json(CleanedChirpResponse { cleaned_body }))
}

/// POST /api/chirps
///
/// **Requires valid JWT access token**; the chirp is owned by the token's account.
pub async fn create_chirp(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<ChirpRequest>,
    storage: web::Data<dyn Storage>,
    clock: web::Data<dyn Clock>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp_body(&form.body)?;
    let now = clock.now();
    let chirp = Chirp {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        body,
        user_id: user.user_id,
    };

    storage.insert_chirp(&chirp).await?;

    tracing::info!(user_id = %user.user_id, chirp_id = %chirp.id, "Chirp created");

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps
///
/// Public: every chirp, oldest first, regardless of owner.
pub async fn list_chirps(storage: web::Data<dyn Storage>) -> Result<HttpResponse, AppError> {
    let chirps = storage.list_chirps().await?;
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    storage: web::Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = storage
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// Only the owner may delete.
///
/// # Errors
/// - 403: Authenticated account does not own the chirp
/// - 404: No such chirp
pub async fn delete_chirp(
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    storage: web::Data<dyn Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = storage
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| StoreError::NotFound("chirp".to_string()))?;

    ensure_owner(chirp.user_id, &user)?;

    if !storage.delete_chirp(chirp_id).await? {
        return Err(StoreError::NotFound("chirp".to_string()).into());
    }

    tracing::info!(user_id = %user.user_id, chirp_id = %chirp_id, "Chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}
