// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion service: resolve -> find-or-open conversation -> persist.

use confab_core::{ConfabError, MessageDirection, MessageStatus};
use confab_storage::{ConversationRegistry, MessageStore};
use serde_json::Value;
use tracing::{debug, info};

use crate::resolver;

/// Result of ingesting one inbound payload.
///
/// `Ignored` is a deliberate no-op, not an error: nothing was persisted and
/// the webhook surface reports it with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored {
        conversation_id: i64,
        message_id: i64,
        direction: MessageDirection,
        status: MessageStatus,
    },
    Ignored {
        reason: String,
    },
}

/// Drives an inbound payload through resolution, the conversation registry,
/// and the message store.
#[derive(Clone)]
pub struct IngestService {
    registry: ConversationRegistry,
    store: MessageStore,
}

impl IngestService {
    pub fn new(registry: ConversationRegistry, store: MessageStore) -> Self {
        Self { registry, store }
    }

    /// Ingest one raw webhook payload.
    ///
    /// Resolution failures (unresolvable sender, empty content) become
    /// [`IngestOutcome::Ignored`] and persist nothing. Storage failures
    /// propagate.
    pub async fn ingest(&self, payload: &Value) -> Result<IngestOutcome, ConfabError> {
        let resolved = match resolver::resolve_sender(payload) {
            Ok(resolved) => resolved,
            Err(e) if e.is_ignorable() => {
                debug!(reason = %e, "inbound payload ignored");
                return Ok(IngestOutcome::Ignored {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let content = match resolver::extract_content(payload) {
            Ok(content) => content,
            Err(e) if e.is_ignorable() => {
                debug!(reason = %e, "inbound payload ignored");
                return Ok(IngestOutcome::Ignored {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let conversation = self
            .registry
            .get_or_open(&resolved.user_identifier, resolved.channel)
            .await?;
        let message = self
            .store
            .persist_inbound(&conversation, &content, &resolved.user_identifier)
            .await?;

        info!(
            conversation_id = conversation.id,
            message_id = message.id,
            channel = %resolved.channel,
            "inbound message stored"
        );
        Ok(IngestOutcome::Stored {
            conversation_id: conversation.id,
            message_id: message.id,
            direction: message.direction,
            status: message.status,
        })
    }
}
