// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Confab delivery engine.
//!
//! Exposes the inbound webhook (`POST /webhook`), the outbound send API
//! (`POST /outbound/send`), and a public health endpoint. The webhook is
//! optionally protected by HMAC signature verification; the outbound API by
//! a bearer token. Both checks are disabled when unconfigured.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
