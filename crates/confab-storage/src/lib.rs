// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Confab delivery engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for
//! conversations and messages. The two public façades are
//! [`ConversationRegistry`] (find-or-create over the active-pair uniqueness
//! invariant) and [`MessageStore`] (persistence plus atomic status
//! transitions).

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod registry;
pub mod store;

pub use database::Database;
pub use models::*;
pub use registry::ConversationRegistry;
pub use store::MessageStore;
