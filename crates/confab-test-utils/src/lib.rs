// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Confab integration tests.
//!
//! Provides a deterministic mock delivery adapter and a test harness for
//! fast, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockDelivery`] - Deterministic delivery adapter with a seeded RNG and
//!   configurable failure rate
//! - [`TestHarness`] - Temp-SQLite storage plus every Confab service, wired
//!   together

pub mod harness;
pub mod mock_delivery;

pub use harness::TestHarness;
pub use mock_delivery::MockDelivery;
