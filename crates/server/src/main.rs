use std::path::PathBuf;

use daybook_api::deploy;
use daybook_server::{build_router, storage, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_server=info,tower_http=info".into()),
        )
        .init();

    // Data directory
    let data_dir = std::env::var(deploy::ENV_DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    tracing::info!("data directory: {}", data_dir.display());

    // Initialize database
    let db = storage::init_db(&data_dir)?;
    tracing::info!("database initialized");

    let config = AppConfig::from_env();
    if !config.registration_open {
        tracing::info!("registration is closed");
    }
    let base_url = config.base_url.clone();

    let app = build_router(AppState::new(db, config));

    tracing::info!("starting server at {base_url}");

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
