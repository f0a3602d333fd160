// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store: persistence and atomic status transitions.

use std::sync::Arc;

use confab_core::ConfabError;

use crate::database::Database;
use crate::models::{Channel, Conversation, Message, MessageDirection, MessageStatus};
use crate::queries;

/// Owns message rows. All message mutation goes through here.
///
/// Fetch operations are point-in-time snapshots; no lock is held across a
/// read and a later write by the same caller. Status transitions for a given
/// message are linearized by the single-writer connection; two concurrent
/// transitions on the same id are last-write-wins.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<Database>,
}

impl MessageStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist an inbound message with status `received`.
    ///
    /// Empty content is rejected: resolution drops empty inbound events
    /// upstream, so reaching this with blank content is a caller bug.
    pub async fn persist_inbound(
        &self,
        conversation: &Conversation,
        content: &str,
        sender: &str,
    ) -> Result<Message, ConfabError> {
        if content.trim().is_empty() {
            return Err(ConfabError::Validation(
                "message content must not be empty".to_string(),
            ));
        }
        queries::messages::insert_message(
            &self.db,
            conversation.id,
            MessageDirection::Inbound,
            MessageStatus::Received,
            content.to_string(),
            Some(sender.to_string()),
        )
        .await
    }

    /// Persist an outbound message with status `queued`.
    pub async fn persist_outbound(
        &self,
        conversation: &Conversation,
        content: &str,
    ) -> Result<Message, ConfabError> {
        if content.trim().is_empty() {
            return Err(ConfabError::Validation(
                "message content must not be empty".to_string(),
            ));
        }
        queries::messages::insert_message(
            &self.db,
            conversation.id,
            MessageDirection::Outbound,
            MessageStatus::Queued,
            content.to_string(),
            None,
        )
        .await
    }

    /// Atomically transition one message. Missing ids warn and succeed.
    pub async fn update_status(
        &self,
        message_id: i64,
        status: MessageStatus,
    ) -> Result<(), ConfabError> {
        queries::messages::update_status(&self.db, message_id, status).await
    }

    /// Get a message by id.
    pub async fn get(&self, id: i64) -> Result<Option<Message>, ConfabError> {
        queries::messages::get(&self.db, id).await
    }

    /// Snapshot of outbound messages still awaiting delivery.
    pub async fn fetch_queued_outbound(&self) -> Result<Vec<Message>, ConfabError> {
        queries::messages::fetch_by_status(
            &self.db,
            MessageStatus::Queued,
            MessageDirection::Outbound,
        )
        .await
    }

    /// Snapshot of unconsumed inbound messages on one channel.
    pub async fn fetch_unread_inbound(
        &self,
        channel: Channel,
    ) -> Result<Vec<Message>, ConfabError> {
        queries::messages::fetch_unread_inbound(&self.db, channel).await
    }

    /// Atomically consume unread inbound messages on one channel: every
    /// returned message has transitioned to `read` and will never be
    /// returned again.
    pub async fn consume_inbound(&self, channel: Channel) -> Result<Vec<Message>, ConfabError> {
        queries::messages::consume_inbound(&self.db, channel).await
    }
}
