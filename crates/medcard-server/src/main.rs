use anyhow::{Context, Result};
use medcard_db::{create_pool_with, run_migrations, PgRepository};
use medcard_server::config::load_config;
use medcard_server::service::PatientService;
use medcard_server::state::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting medcard server");

    let config_path =
        std::env::var("MEDCARD_CONFIG").unwrap_or_else(|_| "medcard.yaml".to_string());
    tracing::info!("Loading config from: {}", config_path);
    let config = load_config(&config_path)?;

    tracing::info!(
        "Connecting to database {} at {}:{}",
        config.db.name,
        config.db.host,
        config.db.port
    );
    let pool = create_pool_with(
        config.db.connect_options(),
        config.db.max_connections,
        config.db.query_timeout(),
    )
    .await
    .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let repo = Arc::new(PgRepository::new(pool, config.db.query_timeout()));
    let service = PatientService::new(repo, config.session.ttl());
    let app = medcard_server::web::build_router(AppState::new(service));

    let listen = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind to {}", listen))?;

    tracing::info!("Server listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping...");
}
