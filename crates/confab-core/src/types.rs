// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Confab crates.
//!
//! Conversations and messages are the two persisted entities. Status strings
//! on the wire and in SQLite are the lowercase `Display` renderings of the
//! enums defined here; parsing goes through `FromStr` so the storage layer
//! and the webhook payloads agree on one vocabulary.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The delivery medium a conversation lives on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
    /// The embeddable web widget. Older payloads label this channel
    /// `widget`; both spellings parse.
    #[strum(to_string = "web", serialize = "widget")]
    #[serde(alias = "widget")]
    Web,
}

/// Direction of a message relative to the system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

/// Lifecycle status of a persisted message.
///
/// Inbound messages move `received -> read` when consumed downstream.
/// Outbound messages move `queued -> sent` or `queued -> failed`; no
/// transition skips `queued`, and `failed` is terminal for a given
/// delivery attempt (retry is an external re-enqueue decision).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Received,
    Read,
    Queued,
    Sent,
    Failed,
}

/// A logical thread between one contact and the system on one channel.
///
/// At most one active conversation exists per (`user_identifier`, `channel`)
/// pair; the storage layer enforces this with a partial unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Row id, assigned on creation.
    pub id: i64,
    /// Channel-scoped contact key (email address, phone number, widget id).
    pub user_identifier: String,
    pub channel: Channel,
    pub is_active: bool,
    /// ISO 8601 timestamp.
    pub created_at: String,
    /// ISO 8601 timestamp.
    pub updated_at: String,
}

/// A single persisted message.
///
/// Ids are monotonically increasing in creation order within one store.
/// Content is never empty at persistence time; empty inbound events are
/// dropped upstream and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub direction: MessageDirection,
    pub status: MessageStatus,
    pub content: String,
    /// Free-text sender identifier; absent on system-originated outbound.
    pub sender: Option<String>,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// Provider acknowledgement for one delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Delivery outcome label; `"sent"` on success.
    pub status: String,
    /// Provider HTTP status code (or equivalent).
    pub status_code: u16,
    /// Provider-assigned message id, when the provider returns one.
    pub provider_id: Option<String>,
    /// Raw provider response body, kept for observability.
    pub raw_body: String,
}

impl DeliveryReceipt {
    /// Whether the provider acknowledged the send.
    pub fn is_sent(&self) -> bool {
        self.status == "sent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn channel_round_trips_through_strings() {
        assert_eq!(Channel::Email.to_string(), "email");
        assert_eq!(Channel::Whatsapp.to_string(), "whatsapp");
        assert_eq!(Channel::Web.to_string(), "web");
        assert_eq!(Channel::from_str("email").unwrap(), Channel::Email);
        assert_eq!(Channel::from_str("whatsapp").unwrap(), Channel::Whatsapp);
        assert_eq!(Channel::from_str("web").unwrap(), Channel::Web);
    }

    #[test]
    fn channel_accepts_legacy_widget_label() {
        assert_eq!(Channel::from_str("widget").unwrap(), Channel::Web);
    }

    #[test]
    fn channel_parsing_is_case_insensitive() {
        assert_eq!(Channel::from_str("WhatsApp").unwrap(), Channel::Whatsapp);
        assert_eq!(Channel::from_str("EMAIL").unwrap(), Channel::Email);
    }

    #[test]
    fn unknown_channel_label_is_rejected() {
        assert!(Channel::from_str("carrier-pigeon").is_err());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            MessageStatus::Received,
            MessageStatus::Read,
            MessageStatus::Queued,
            MessageStatus::Sent,
            MessageStatus::Failed,
        ] {
            let rendered = status.to_string();
            assert_eq!(MessageStatus::from_str(&rendered).unwrap(), status);
        }
    }

    #[test]
    fn direction_serializes_lowercase_in_json() {
        let json = serde_json::to_string(&MessageDirection::Inbound).unwrap();
        assert_eq!(json, "\"inbound\"");
    }

    #[test]
    fn receipt_sent_flag() {
        let receipt = DeliveryReceipt {
            status: "sent".into(),
            status_code: 200,
            provider_id: Some("prov-1".into()),
            raw_body: "{}".into(),
        };
        assert!(receipt.is_sent());
    }
}
