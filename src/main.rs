use blog_admin_api::{
    app::{app, AppState},
    config::config,
    database::{Backend, DatabaseManager},
    is_development,
    services::AdminService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Blog Admin API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set outside development");
    }
    if is_development!() {
        tracing::warn!("Development mode: default JWT secret may be in use");
    }

    let backend = Backend::from_config(config).await?;

    if let Some(name) = &config.storage.bootstrap_admin {
        let service = AdminService::new(&backend, Default::default());
        match service.bootstrap_admin(name).await? {
            Some(user) => tracing::info!("Bootstrapped administrator '{}' ({})", user.display_name, user.id),
            None => tracing::debug!("Administrators already exist; skipping bootstrap"),
        }
    }

    let router = app(AppState::new(backend), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Blog Admin API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
