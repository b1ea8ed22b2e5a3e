use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use flightdata_api::{app, state::supplier_settings, AppState};
use flightdata_core::{FlightRepository, InMemoryFlightRepository};
use flightdata_store::app_config::{Config, StorageBackend};
use flightdata_store::{DbClient, PostgresFlightRepository};
use flightdata_supplier::CrazySupplierClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "flightdata_api=debug,flightdata_search=debug,flightdata_supplier=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting flightdata API on port {}", config.server.port);

    let repo: Arc<dyn FlightRepository> = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database)
                .await
                .context("Failed to connect to Postgres")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Arc::new(PostgresFlightRepository::new(db.pool.clone()))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; flights are lost on restart");
            Arc::new(InMemoryFlightRepository::new())
        }
    };

    let supplier = CrazySupplierClient::new(supplier_settings(&config.supplier))
        .context("Failed to build CrazySupplier client")?;

    let app = app(AppState::new(repo, Arc::new(supplier), config.search.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
