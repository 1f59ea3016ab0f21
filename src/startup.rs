use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{RequestAuthorizer, SessionService};
use crate::clock::Clock;
use crate::configuration::{DatabaseSettings, Settings};
use crate::error::{AppError, StoreError};
use crate::middleware::{FileserverHits, HitCounterMiddleware, JwtMiddleware};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    metrics, refresh, reset, revoke, update_user, validate_chirp,
};
use crate::storage::{PgStorage, Storage};

/// Open the Postgres pool and bring the schema up to date
pub async fn connect_storage(settings: &DatabaseSettings) -> Result<PgStorage, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.connection_string())
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::StoreUnavailable(format!("migration failed: {}", e)))?;

    tracing::info!(database = %settings.database_name, "Database ready");
    Ok(PgStorage::new(pool))
}

pub fn run(
    listener: TcpListener,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let hits = Arc::new(FileserverHits::new());
    let session = SessionService::new(storage.clone(), clock.clone(), settings.jwt.clone());
    let authorizer = RequestAuthorizer::new(settings.jwt.secret.clone(), clock.clone());
    let static_dir = settings.application.static_dir.clone();

    let storage_data: web::Data<dyn Storage> = web::Data::from(storage);
    let clock_data: web::Data<dyn Clock> = web::Data::from(clock);
    let hits_data = web::Data::from(hits.clone());
    let session_data = web::Data::new(session);
    let application_data = web::Data::new(settings.application);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())

            // Shared state
            .app_data(storage_data.clone())
            .app_data(clock_data.clone())
            .app_data(hits_data.clone())
            .app_data(session_data.clone())
            .app_data(application_data.clone())

            // Public routes (no authentication required).
            // Registered before the protected scope so method guards let
            // PUT/POST/DELETE fall through to it.
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/validate_chirp", web::post().to(validate_chirp))
            .route("/api/chirps", web::get().to(list_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Protected routes (require JWT access token)
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(authorizer.clone()))
                    .route("/users", web::put().to(update_user))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps/{chirp_id}", web::delete().to(delete_chirp)),
            )

            // Static file serving, counted for /admin/metrics
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(hits.clone()))
                    .service(fs::Files::new("/", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
