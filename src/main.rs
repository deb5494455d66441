use pgp_drop::{
    build_router, config::ConfigError, logging::init_logging, server::utils::check_entropy_source,
    AppConfig, AppState,
};
use std::net::SocketAddr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Secure random source unavailable: {0}")]
    Entropy(#[from] rand::Error),
    #[error("Logging error: {0}")]
    Logging(String),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging().map_err(|e| AppError::Logging(e.to_string()))?;
    info!("Starting PGP drop server");

    let config = AppConfig::load()?;
    info!(
        target: "config",
        storage_root = %config.storage.root.display(),
        max_upload_mb = config.storage.max_upload_mb,
        "Configuration loaded successfully"
    );

    check_entropy_source()?;

    let addr = config.listen_addr()?;
    let state = AppState::new(config)?;
    let app = build_router(state);

    info!(target: "server", "Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
