// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use confab_core::ConfabError;
use confab_dispatch::DispatchService;
use confab_ingest::IngestService;
use confab_storage::ConversationRegistry;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
///
/// Services are injected here at construction; handlers never reach for
/// globals.
#[derive(Clone)]
pub struct GatewayState {
    /// Inbound ingestion pipeline.
    pub ingest: IngestService,
    /// Conversation lookup for outbound validation.
    pub registry: ConversationRegistry,
    /// Outbound dispatch pipeline.
    pub dispatch: DispatchService,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Health state for the public endpoint.
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `ServerConfig` from confab-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
///
/// Routes:
/// - `GET /health` (public)
/// - `POST /webhook` (HMAC-signature check inside the handler, when configured)
/// - `POST /outbound/send` (bearer auth, when configured)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let webhook_routes = Router::new()
        .route("/webhook", post(handlers::post_webhook))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/outbound/send", post(handlers::post_outbound_send))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until the task is aborted.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ConfabError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConfabError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ConfabError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
