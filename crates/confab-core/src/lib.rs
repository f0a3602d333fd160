// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core trait definitions, error types, and domain types for Confab.
//!
//! This crate has no I/O of its own. It defines the message and conversation
//! domain model, the [`ConfabError`] taxonomy shared across all crates, and
//! the [`DeliveryAdapter`] capability trait that outbound channels implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ConfabError;
pub use traits::delivery::DeliveryAdapter;
pub use types::{
    Channel, Conversation, DeliveryReceipt, Message, MessageDirection, MessageStatus,
};
