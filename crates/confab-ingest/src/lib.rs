// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound side of the Confab delivery engine.
//!
//! [`resolver`] turns a raw, loosely-typed webhook payload into a stable
//! `(user_identifier, channel)` pair plus message content; [`IngestService`]
//! drives a resolved payload through the conversation registry and the
//! message store.

pub mod resolver;
pub mod service;

pub use resolver::{resolve_sender, ResolvedSender, FALLBACK_IDENTIFIER};
pub use service::{IngestOutcome, IngestService};
