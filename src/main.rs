use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod http;
mod messaging;
mod metrics;
mod store;

use config::{Config, IngestionMode};
use domain::order::{IngestionBackend, OrderIngestor, OrderPublisher, OrderRepository};
use messaging::{RabbitMqConfig, RabbitMqTransport};
use store::PgOrderStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // RUST_LOG wins; otherwise DEBUG=true turns on debug output for this crate.
    let default_filter = if config.debug {
        "info,order_webhook=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!(
        environment = %config.environment,
        mode = ?config.ingestion_mode,
        "🚀 Starting order webhook service"
    );

    if config.database_url_defaulted {
        tracing::warn!("DATABASE_URL not set, using the local development database");
    }

    // === 1. Relational store ===
    tracing::info!("Connecting to Postgres...");
    let store = PgOrderStore::connect(&config.database_url, config.database_max_connections).await?;
    store.init_schema().await?;
    let store = Arc::new(store);

    let repository = || {
        OrderRepository::new(
            store.clone(),
            config.address_country.clone(),
            config.write_timeout,
        )
    };

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Ingestion backend ===
    let backend = match config.ingestion_mode {
        IngestionMode::Repository => IngestionBackend::RepositoryBacked(repository()),
        IngestionMode::Broker => {
            let transport = RabbitMqTransport::new(&RabbitMqConfig {
                url: config.amqp_url.clone(),
                pool_size: config.amqp_pool_size,
            })?;
            IngestionBackend::BrokerBacked(OrderPublisher::new(
                Arc::new(transport),
                config.write_timeout,
            ))
        }
    };
    tracing::info!(backend = backend.name(), "Ingestion backend ready");

    // === 4. HTTP server ===
    let state = http::AppState {
        ingestor: Arc::new(OrderIngestor::new(backend)),
        orders: Arc::new(repository()),
        metrics,
        request_timeout: config.request_timeout,
    };

    http::serve(state, &config.listen_host, config.listen_port).await?;

    tracing::info!("👋 Server stopped");

    Ok(())
}
