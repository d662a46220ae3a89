use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use treino::config::{init_tracing, run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use treino::services::Mailer;
use treino::{create_routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.log_level)?;

    if config.uses_dev_jwt_secret() {
        warn!("JWT_SECRET not set, using the development secret");
    }

    let db_config = DatabaseConfig::from_env()?;
    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await.context("failed to run migrations")?;

    if config.seed_database {
        DatabaseSeeder::new(pool.clone(), config.tokens.bcrypt_cost)
            .seed_all()
            .await
            .context("failed to seed database")?;
    }

    let mailer = Mailer::from_config(config.smtp.as_ref())?;
    let state = AppState::from_config(pool, &config, mailer);
    let app = create_routes(state);

    let address = config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(environment = %config.environment, "Treino API listening on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
