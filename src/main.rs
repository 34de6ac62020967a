use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    astraflow_core::util::init_logging();

    // Read port from environment variable, default to 47910
    let port = env::var("ASTRAFLOW_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(47910);

    let config = astraflow_core::config::AppConfig::load()?;

    // Log startup message
    info!("Starting Astraflow Core server on port {}", port);

    // Run the server
    astraflow_core::server::run_server(port, config).await
}
