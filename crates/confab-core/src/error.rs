// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Confab delivery engine.

use thiserror::Error;

/// The primary error type used across all Confab crates.
#[derive(Debug, Error)]
pub enum ConfabError {
    /// No sender identity could be derived from an inbound payload.
    ///
    /// Expected and benign: the webhook surface reports it as an "ignored"
    /// outcome, never as a server error.
    #[error("sender could not be resolved from payload")]
    UnresolvedSender,

    /// An inbound payload carried no non-empty content field.
    ///
    /// Expected and benign, same handling as [`ConfabError::UnresolvedSender`].
    #[error("message content is empty")]
    EmptyContent,

    /// A caller-supplied value failed validation (bad id, blank content).
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced conversation does not exist.
    #[error("conversation {0} not found")]
    ConversationNotFound(i64),

    /// The delivery provider rejected or failed an outbound send.
    ///
    /// Carries enough structured context for the caller to log the failure
    /// and to return provider detail to an API consumer.
    #[error("delivery failed for conversation {conversation_id}: {status}")]
    Delivery {
        conversation_id: i64,
        /// Provider status: an HTTP status code, "transport", or "timeout".
        status: String,
        /// Raw provider response body (or transport error text).
        body: String,
    },

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel-facing errors (bind failure, malformed wire data).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConfabError {
    /// Whether this error is a benign ingest outcome rather than a fault.
    ///
    /// Benign errors are converted to `{status: "ignored"}` responses at the
    /// webhook boundary and persist nothing.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::UnresolvedSender | Self::EmptyContent)
    }
}
