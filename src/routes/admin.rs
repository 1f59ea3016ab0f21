use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};
use crate::middleware::FileserverHits;
use crate::storage::Storage;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<FileserverHits>) -> HttpResponse {
    let body = format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits.get()
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

/// POST /admin/reset
///
/// Wipes every account (chirps and refresh tokens go with them) and zeroes the
/// hit counter. Only allowed on the `dev` platform.
pub async fn reset(
    settings: web::Data<ApplicationSettings>,
    storage: web::Data<dyn Storage>,
    hits: web::Data<FileserverHits>,
) -> Result<HttpResponse, AppError> {
    if !settings.is_dev() {
        tracing::warn!(platform = %settings.platform, "Reset refused outside dev platform");
        return Err(AuthError::Forbidden.into());
    }

    let removed = storage.delete_all_accounts().await?;
    hits.reset();

    tracing::info!(removed_accounts = removed, "Application state reset");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits reset to 0 and database reset to initial state."))
}
