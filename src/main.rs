//! wabridge webhook bridge.
//!
//! Main entry point for the wabridge server. Loads configuration, prepares
//! the database, and serves the HTTP API until a shutdown signal arrives.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use wabridge_api::{AppState, Config};
use wabridge_core::{
    storage::{schema, PostgresBridgeStorage},
    RealClock,
};
use wabridge_gateway::GatewayClient;

const DEFAULT_LOG_FILTER: &str = "info,wabridge=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting wabridge webhook bridge");
    info!(
        database_url = %config.database_url_masked(),
        host = %config.host,
        port = config.port,
        max_connections = config.database_max_connections,
        gateway = %config.to_gateway_config().method_url_masked("sendMessage"),
        "Configuration loaded"
    );

    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    schema::create_tables(&db_pool).await.context("Failed to create database tables")?;
    info!("Database tables ready");

    let gateway =
        GatewayClient::new(config.to_gateway_config()).context("Failed to build gateway client")?;
    let state = AppState::new(
        Arc::new(PostgresBridgeStorage::new(db_pool.clone())),
        gateway,
        Arc::new(RealClock::new()),
    );

    let addr = config.parse_server_addr()?;
    info!(addr = %addr, "wabridge is ready to relay messages");

    wabridge_api::start_server(state, addr, Duration::from_secs(config.request_timeout))
        .await
        .context("HTTP server failed")?;

    db_pool.close().await;
    info!("Database connections closed");

    info!("wabridge shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
///
/// `RUST_LOG` wins when set; otherwise the configured level is used, and an
/// unparseable level falls back to the built-in filter.
fn init_tracing(configured: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    let mut retries = 0;

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    error = %e,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}
