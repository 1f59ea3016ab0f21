#![allow(dead_code)]

use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use std::sync::Arc;

use chirpy::clock::MockClock;
use chirpy::configuration::{
    get_configuration, ApplicationSettings, DatabaseSettings, JwtSettings, Settings,
};
use chirpy::startup::run;
use chirpy::storage::{MemoryStorage, PgStorage, Storage};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub address: String,
    pub clock: Arc<MockClock>,
    pub client: reqwest::Client,
    /// Set when the app runs on Postgres
    pub db_pool: Option<PgPool>,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy".to_string(),
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: format!("{}/public", env!("CARGO_MANIFEST_DIR")),
        },
        jwt: JwtSettings {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_seconds: 3600,
            refresh_token_expiry_days: 60,
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_on("dev").await
}

pub async fn spawn_app_on(platform: &str) -> TestApp {
    launch(Arc::new(MemoryStorage::new()), test_settings(platform), None)
}

/// Same server, backed by a freshly created and migrated Postgres database
pub async fn spawn_app_with_postgres() -> TestApp {
    let mut settings = test_settings("dev");
    settings.database = fresh_database_settings();
    let pool = configure_database(&settings.database).await;

    launch(
        Arc::new(PgStorage::new(pool.clone())),
        settings,
        Some(pool),
    )
}

fn launch(storage: Arc<dyn Storage>, settings: Settings, db_pool: Option<PgPool>) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let clock = Arc::new(MockClock::default());

    let server = run(listener, storage, clock.clone(), settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        clock,
        client: reqwest::Client::new(),
        db_pool,
    }
}

/// Database settings from `configuration.yaml` with a unique database name
pub fn fresh_database_settings() -> DatabaseSettings {
    let mut database = get_configuration()
        .expect("Failed to read configuration.")
        .database;
    database.database_name = uuid::Uuid::new_v4().to_string();
    database
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register then log in, returning the login body
    pub async fn signed_in(&self, email: &str, password: &str) -> Value {
        assert_eq!(201, self.register(email, password).await.status().as_u16());
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
