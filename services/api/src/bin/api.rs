//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, StaticCredentialVerifier},
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Choose the Backing Store ---
    let app_state = match config.database_url.clone() {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");

            let verifier = Arc::new(StaticCredentialVerifier::new(
                config.admin_username.clone(),
                config.admin_password.clone(),
            ));
            AppState::new(
                config,
                db_adapter.clone(),
                db_adapter.clone(),
                db_adapter,
                verifier,
            )?
        }
        None => {
            info!("No DATABASE_URL set; counters and sessions are kept in memory.");
            AppState::in_memory(config)?
        }
    };
    let app_state = Arc::new(app_state);
    let bind_address = app_state.config.bind_address;

    // --- 3. Create the Web Router ---
    let app = build_router(app_state);

    // --- 4. Start the Server ---
    info!("Starting server on {}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
