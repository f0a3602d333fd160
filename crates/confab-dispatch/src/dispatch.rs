// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch orchestration for a single outbound message.

use std::sync::Arc;
use std::time::Duration;

use confab_core::{
    ConfabError, Conversation, DeliveryAdapter, DeliveryReceipt, MessageStatus,
};
use confab_storage::MessageStore;
use tracing::{debug, error, info, warn};

/// Upper bound on one delivery attempt. A timed-out attempt is handled
/// identically to any other delivery failure.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates persist -> deliver -> transition for one outbound message.
///
/// The adapter and store are injected at construction; there are no
/// process-wide singletons.
#[derive(Clone)]
pub struct DispatchService {
    store: MessageStore,
    adapter: Arc<dyn DeliveryAdapter>,
    delivery_timeout: Duration,
}

impl DispatchService {
    pub fn new(store: MessageStore, adapter: Arc<dyn DeliveryAdapter>) -> Self {
        Self {
            store,
            adapter,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    /// Override the per-attempt delivery timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Dispatch one outbound message.
    ///
    /// The `queued` row is committed before any delivery attempt, so the
    /// message exists even if delivery (or the process) subsequently dies.
    /// Delivery itself runs outside any storage transaction. Whatever the
    /// adapter does, the message ends as `sent` or `failed` -- never
    /// `queued` -- and a delivery failure is recorded in storage *before*
    /// being surfaced to the caller.
    pub async fn dispatch(
        &self,
        conversation: &Conversation,
        content: &str,
    ) -> Result<DeliveryReceipt, ConfabError> {
        let message = self.store.persist_outbound(conversation, content).await?;
        debug!(
            message_id = message.id,
            conversation_id = conversation.id,
            adapter = self.adapter.name(),
            "outbound message queued"
        );

        let outcome = match tokio::time::timeout(
            self.delivery_timeout,
            self.adapter.send(conversation.id, content),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ConfabError::Timeout {
                duration: self.delivery_timeout,
            }),
        };

        match outcome {
            Ok(receipt) => {
                self.store
                    .update_status(message.id, MessageStatus::Sent)
                    .await?;
                info!(
                    message_id = message.id,
                    conversation_id = conversation.id,
                    "outbound message sent"
                );
                Ok(receipt)
            }
            Err(delivery_err) => {
                // Record the failure before re-raising it, so the persisted
                // state matches what the caller observes.
                if let Err(storage_err) = self
                    .store
                    .update_status(message.id, MessageStatus::Failed)
                    .await
                {
                    error!(
                        message_id = message.id,
                        error = %storage_err,
                        "could not record failed delivery status"
                    );
                }
                warn!(
                    message_id = message.id,
                    conversation_id = conversation.id,
                    error = %delivery_err,
                    "outbound delivery failed"
                );
                Err(delivery_err)
            }
        }
    }
}
