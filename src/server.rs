//! Process wiring shared by the `asset-inventory` binary and `inventory serve`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::TokenValidator;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, InventoryStore, MemoryStore, PgStore};
use crate::graph::{DeviceDirectory, DisabledDirectory, GraphClient};
use crate::routes;
use crate::state::AppState;

/// Human-readable logs in development, JSON lines everywhere else.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing(config: &AppConfig) {
    let default_filter = if config.is_development() {
        "info,asset_inventory=debug,tower_http=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.is_development() {
        builder.try_init()
    } else {
        builder.json().with_current_span(true).try_init()
    };
    if result.is_err() {
        warn!("Tracing subscriber was already initialized");
    }
}

pub async fn build_state(config: AppConfig, in_memory: bool) -> anyhow::Result<AppState> {
    let store: Arc<dyn InventoryStore> = if in_memory {
        warn!("Using the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to open the database pool")?;
        Arc::new(PgStore::new(pool))
    };

    let devices: Arc<dyn DeviceDirectory> = match GraphClient::new(&config.graph) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("Intune lookups disabled: {}", e);
            Arc::new(DisabledDirectory)
        }
    };

    let tokens = if config.security.auth.enabled {
        match TokenValidator::from_config(&config.security.auth).await {
            Ok(validator) => Some(Arc::new(validator)),
            Err(e) => {
                // Protected routes answer 503 until this is fixed.
                tracing::error!("Token validation unavailable: {}", e);
                None
            }
        }
    } else {
        warn!("Authentication is disabled; every request runs as the development user");
        None
    };

    Ok(AppState::new(Arc::new(config), store, devices, tokens))
}

pub async fn run(state: AppState) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        "Asset Inventory API listening on http://{} ({:?})",
        bind_addr, state.config.environment
    );

    axum::serve(
        listener,
        routes::app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
