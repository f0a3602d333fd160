// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery adapter trait for outbound message channels.

use async_trait::async_trait;

use crate::error::ConfabError;
use crate::types::DeliveryReceipt;

/// Adapter that performs the actual external send for one outbound message.
///
/// Implementations must report failure as [`ConfabError::Delivery`] with the
/// conversation id, provider status, and raw body attached -- never as a
/// panic. Callers wrap every `send` in a bounded timeout; a timed-out call
/// is treated identically to any other delivery failure.
///
/// Two implementations ship with Confab: the real HTTP adapter in
/// `confab-delivery` and a deterministic mock in `confab-test-utils`.
#[async_trait]
pub trait DeliveryAdapter: Send + Sync {
    /// Human-readable adapter name, used in logs.
    fn name(&self) -> &str;

    /// Sends one message through the channel.
    async fn send(
        &self,
        conversation_id: i64,
        content: &str,
    ) -> Result<DeliveryReceipt, ConfabError>;
}
