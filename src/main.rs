use std::net::TcpListener;
use std::sync::Arc;

use chirpy::clock::SystemClock;
use chirpy::configuration::get_configuration;
use chirpy::startup::{connect_storage, run};
use chirpy::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let configuration = get_configuration().map_err(|e| {
        tracing::error!(error = %e, "Failed to read configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;
    tracing::info!(platform = %configuration.application.platform, "Configuration loaded");

    let storage = connect_storage(&configuration.database).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to prepare database");
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database error")
    })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, "Server listening");

    run(listener, Arc::new(storage), Arc::new(SystemClock), configuration)?.await
}
