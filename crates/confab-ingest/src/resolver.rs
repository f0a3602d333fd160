// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel and sender resolution for heterogeneous webhook payloads.
//!
//! Providers have shipped several payload shapes over time, so resolution is
//! an explicit, total, ordered priority function rather than per-provider
//! parsing. First match wins:
//!
//! 1. an explicit channel marker (`channel` / `channel_type`);
//! 2. a contact-like sub-object carrying a phone number -> whatsapp;
//! 3. an email address at any of the known keys -> email;
//! 4. no signal at all -> email with one fixed placeholder identifier.
//!
//! Resolution is a pure function of the payload; it never touches storage.

use std::str::FromStr;

use confab_core::{Channel, ConfabError};
use serde_json::{Map, Value};

/// The single placeholder identifier used when a payload carries no sender
/// signal. Always the same value so repeat anonymous events share one
/// conversation rather than fanning out per message.
pub const FALLBACK_IDENTIFIER: &str = "unknown-sender";

/// Keys that may carry an explicit channel marker.
const CHANNEL_KEYS: &[&str] = &["channel", "channel_type"];

/// Keys under which providers nest a contact-like sub-object.
const CONTACT_KEYS: &[&str] = &["contact", "from", "sender"];

/// Phone-number keys inside a contact-like sub-object.
const PHONE_KEYS: &[&str] = &["phone", "phone_number", "wa_id"];

/// Email keys inside a contact-like sub-object.
const EMAIL_KEYS: &[&str] = &["email", "email_address"];

/// Top-level keys that may hold a bare email address.
const TOP_LEVEL_SENDER_KEYS: &[&str] = &["sender", "from", "email"];

/// Top-level keys that may hold an opaque user/visitor identifier.
const TOP_LEVEL_ID_KEYS: &[&str] = &["sender", "from", "user_id", "visitor_id", "session_id"];

/// Paths probed for message content, in priority order.
const CONTENT_PATHS: &[&[&str]] = &[&["content"], &["message", "content"], &["data", "content"]];

/// A resolved sender identity: the channel-scoped contact key and the
/// channel it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSender {
    pub user_identifier: String,
    pub channel: Channel,
}

/// Resolve the sender identity from a raw inbound payload.
///
/// Total for JSON objects (rule 4 is a catch-all); fails with
/// [`ConfabError::UnresolvedSender`] only when the payload is not an object
/// and therefore carries no keyed signal at all.
pub fn resolve_sender(payload: &Value) -> Result<ResolvedSender, ConfabError> {
    let body = payload.as_object().ok_or(ConfabError::UnresolvedSender)?;

    // 1. An explicit channel marker wins outright.
    if let Some(channel) = explicit_channel(body) {
        return Ok(ResolvedSender {
            user_identifier: identifier_for_channel(body, channel),
            channel,
        });
    }

    // 2. A contact with a phone number is a WhatsApp sender.
    if let Some(phone) = contact_field(body, PHONE_KEYS) {
        return Ok(ResolvedSender {
            user_identifier: phone,
            channel: Channel::Whatsapp,
        });
    }

    // 3. An email address anywhere at the known keys.
    if let Some(email) = contact_field(body, EMAIL_KEYS).or_else(|| top_level_email(body)) {
        return Ok(ResolvedSender {
            user_identifier: email,
            channel: Channel::Email,
        });
    }

    // 4. No signal: default to email with the fixed placeholder.
    Ok(ResolvedSender {
        user_identifier: FALLBACK_IDENTIFIER.to_string(),
        channel: Channel::Email,
    })
}

/// Extract message content from a payload.
///
/// Probes `content`, then `message.content`, then `data.content`; the first
/// non-empty string wins.
pub fn extract_content(payload: &Value) -> Result<String, ConfabError> {
    CONTENT_PATHS
        .iter()
        .filter_map(|path| lookup(payload, path))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ConfabError::EmptyContent)
}

fn lookup<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |value, key| value.get(key))
}

fn explicit_channel(body: &Map<String, Value>) -> Option<Channel> {
    CHANNEL_KEYS
        .iter()
        .filter_map(|key| body.get(*key)?.as_str())
        .find_map(|raw| Channel::from_str(raw).ok())
}

/// Best identifier for an explicitly-marked channel: the channel's natural
/// contact key first, then any opaque top-level id, then the placeholder.
fn identifier_for_channel(body: &Map<String, Value>, channel: Channel) -> String {
    let natural = match channel {
        Channel::Whatsapp => contact_field(body, PHONE_KEYS),
        Channel::Email => contact_field(body, EMAIL_KEYS).or_else(|| top_level_email(body)),
        Channel::Web => None,
    };
    natural
        .or_else(|| first_string(body, TOP_LEVEL_ID_KEYS))
        .unwrap_or_else(|| FALLBACK_IDENTIFIER.to_string())
}

fn contact_field(body: &Map<String, Value>, field_keys: &[&str]) -> Option<String> {
    CONTACT_KEYS
        .iter()
        .filter_map(|key| body.get(*key)?.as_object())
        .find_map(|contact| {
            field_keys
                .iter()
                .filter_map(|key| contact.get(*key)?.as_str())
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
}

fn top_level_email(body: &Map<String, Value>) -> Option<String> {
    TOP_LEVEL_SENDER_KEYS
        .iter()
        .filter_map(|key| body.get(*key)?.as_str())
        .map(str::trim)
        .find(|s| s.contains('@'))
        .map(str::to_string)
}

fn first_string(body: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| body.get(*key)?.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_channel_marker_wins() {
        let payload = json!({
            "channel": "whatsapp",
            "contact": {"email": "user@example.com", "phone": "+358401234567"},
        });
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Whatsapp);
        assert_eq!(resolved.user_identifier, "+358401234567");
    }

    #[test]
    fn legacy_widget_marker_maps_to_web() {
        let payload = json!({"channel": "widget", "sender": "visitor-42"});
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Web);
        assert_eq!(resolved.user_identifier, "visitor-42");
    }

    #[test]
    fn unknown_channel_marker_falls_through() {
        let payload = json!({
            "channel": "fax",
            "contact": {"phone": "+14155550100"},
        });
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Whatsapp);
    }

    #[test]
    fn contact_phone_means_whatsapp() {
        let payload = json!({"contact": {"phone": "+14155550100"}});
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Whatsapp);
        assert_eq!(resolved.user_identifier, "+14155550100");
    }

    #[test]
    fn wa_id_counts_as_a_phone_number() {
        let payload = json!({"from": {"wa_id": "14155550100"}});
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Whatsapp);
        assert_eq!(resolved.user_identifier, "14155550100");
    }

    #[test]
    fn contact_email_means_email_channel() {
        let payload = json!({"contact": {"email": "person@example.org"}});
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Email);
        assert_eq!(resolved.user_identifier, "person@example.org");
    }

    #[test]
    fn bare_email_sender_means_email_channel() {
        let payload = json!({"sender": "user@example.com", "content": "Hello"});
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Email);
        assert_eq!(resolved.user_identifier, "user@example.com");
    }

    #[test]
    fn phone_outranks_email_when_both_present() {
        let payload = json!({
            "contact": {"phone": "+14155550100", "email": "user@example.com"},
        });
        let resolved = resolve_sender(&payload).unwrap();
        assert_eq!(resolved.channel, Channel::Whatsapp);
    }

    #[test]
    fn signal_free_payload_gets_the_fixed_placeholder() {
        let first = resolve_sender(&json!({"content": "hi"})).unwrap();
        let second = resolve_sender(&json!({"content": "hi again", "extra": 1})).unwrap();
        assert_eq!(first.channel, Channel::Email);
        assert_eq!(first.user_identifier, FALLBACK_IDENTIFIER);
        assert_eq!(second.user_identifier, FALLBACK_IDENTIFIER);
    }

    #[test]
    fn non_object_payload_is_unresolvable() {
        assert!(matches!(
            resolve_sender(&json!("just a string")),
            Err(ConfabError::UnresolvedSender)
        ));
        assert!(matches!(
            resolve_sender(&json!([1, 2, 3])),
            Err(ConfabError::UnresolvedSender)
        ));
    }

    #[test]
    fn content_paths_probe_in_order() {
        assert_eq!(
            extract_content(&json!({"content": "top"})).unwrap(),
            "top"
        );
        assert_eq!(
            extract_content(&json!({"message": {"content": "nested"}})).unwrap(),
            "nested"
        );
        assert_eq!(
            extract_content(&json!({"data": {"content": "deep"}})).unwrap(),
            "deep"
        );
        assert_eq!(
            extract_content(&json!({
                "content": "wins",
                "message": {"content": "loses"},
            }))
            .unwrap(),
            "wins"
        );
    }

    #[test]
    fn blank_top_level_content_falls_through_to_nested() {
        let payload = json!({"content": "  ", "message": {"content": "real"}});
        assert_eq!(extract_content(&payload).unwrap(), "real");
    }

    #[test]
    fn missing_or_empty_content_is_rejected() {
        assert!(matches!(
            extract_content(&json!({"sender": "a@b.c"})),
            Err(ConfabError::EmptyContent)
        ));
        assert!(matches!(
            extract_content(&json!({"content": ""})),
            Err(ConfabError::EmptyContent)
        ));
        assert!(matches!(
            extract_content(&json!({"content": 42})),
            Err(ConfabError::EmptyContent)
        ));
    }
}
