// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation registry: find-or-create semantics over the active-pair index.

use std::sync::Arc;

use confab_core::ConfabError;
use tracing::debug;

use crate::database::Database;
use crate::models::{Channel, Conversation};
use crate::queries;

/// Owns conversation rows. All conversation mutation goes through here.
///
/// Cloning shares the underlying single-writer connection.
#[derive(Clone)]
pub struct ConversationRegistry {
    db: Arc<Database>,
}

impl ConversationRegistry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Return the single active conversation for the pair, opening one if
    /// none exists.
    ///
    /// Idempotent until [`close`](Self::close) is called for the pair:
    /// concurrent callers racing on creation all end up with the same row,
    /// because a losing creator observes the storage-layer uniqueness
    /// constraint and re-reads the winner.
    pub async fn get_or_open(
        &self,
        user_identifier: &str,
        channel: Channel,
    ) -> Result<Conversation, ConfabError> {
        let conversation = queries::conversations::get_or_open(&self.db, user_identifier, channel)
            .await?;
        debug!(
            conversation_id = conversation.id,
            user_identifier,
            channel = %channel,
            "conversation resolved"
        );
        Ok(conversation)
    }

    /// Get a conversation by id.
    pub async fn get(&self, id: i64) -> Result<Option<Conversation>, ConfabError> {
        queries::conversations::get(&self.db, id).await
    }

    /// Close a conversation. Explicit external operation; ingest and
    /// dispatch never close anything.
    pub async fn close(&self, id: i64) -> Result<bool, ConfabError> {
        queries::conversations::close(&self.db, id).await
    }
}
