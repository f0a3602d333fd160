// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side of the Confab delivery engine.
//!
//! [`DispatchService`] orchestrates a single outbound send: persist the
//! message as `queued`, attempt delivery through the adapter, transition the
//! status. [`OutboundWorker`] is the background loop that flushes queued
//! messages independently of any HTTP request. [`shutdown`] wires process
//! signals to cooperative cancellation.

pub mod dispatch;
pub mod shutdown;
pub mod worker;

pub use dispatch::{DispatchService, DEFAULT_DELIVERY_TIMEOUT};
pub use worker::{OutboundWorker, DEFAULT_POLL_INTERVAL};
