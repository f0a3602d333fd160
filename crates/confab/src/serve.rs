// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `confab serve` command implementation.
//!
//! Wires configuration into the full engine: SQLite storage, the HTTP
//! delivery adapter, the dispatch service, the outbound worker, and the
//! axum gateway. Supports graceful shutdown via signal handlers: the
//! worker's in-flight tick completes before the process exits.

use std::sync::Arc;
use std::time::Duration;

use confab_config::ConfabConfig;
use confab_core::{ConfabError, DeliveryAdapter};
use confab_delivery::{HttpDelivery, HttpDeliveryConfig};
use confab_dispatch::{shutdown, DispatchService, OutboundWorker};
use confab_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use confab_ingest::IngestService;
use confab_storage::{ConversationRegistry, Database, MessageStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Runs the `confab serve` command.
pub async fn run_serve(config: ConfabConfig) -> Result<(), ConfabError> {
    init_tracing(&config.log.level);
    info!("starting confab serve");

    // Storage: one single-writer connection shared by every service.
    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    info!(path = config.storage.database_path.as_str(), "storage initialized");

    let registry = ConversationRegistry::new(db.clone());
    let store = MessageStore::new(db.clone());
    let ingest = IngestService::new(registry.clone(), store.clone());

    // Delivery adapter and dispatch pipeline.
    let delivery_timeout = Duration::from_secs(config.delivery.timeout_secs);
    let adapter: Arc<dyn DeliveryAdapter> = Arc::new(HttpDelivery::new(&HttpDeliveryConfig {
        endpoint: config.delivery.endpoint.clone(),
        api_token: config.delivery.api_token.clone(),
        timeout: delivery_timeout,
    })?);
    let dispatch =
        DispatchService::new(store.clone(), adapter.clone()).with_timeout(delivery_timeout);

    // Background worker flushing queued outbound messages.
    let worker = OutboundWorker::new(
        store.clone(),
        adapter,
        Duration::from_secs(config.worker.poll_interval_secs),
    )
    .with_delivery_timeout(delivery_timeout);
    if config.worker.enabled {
        worker.start().await;
    } else {
        info!("outbound worker disabled by configuration");
    }

    // Gateway HTTP server.
    let state = GatewayState {
        ingest,
        registry,
        dispatch,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
            webhook_secret: config.server.webhook_secret.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let server_handle = tokio::spawn(async move {
        if let Err(e) = confab_gateway::start_server(&server_config, state).await {
            error!(error = %e, "gateway server error");
        }
    });

    // Block until SIGINT/SIGTERM, then drain.
    let token = shutdown::install_signal_handler();
    token.cancelled().await;

    info!("shutting down");
    worker.stop().await;
    server_handle.abort();
    db.close().await?;
    info!("shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber from the configured level.
///
/// `RUST_LOG` takes precedence over the config file when set.
fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
