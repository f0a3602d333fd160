// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations and status transitions.

use confab_core::ConfabError;
use rusqlite::params;
use tracing::warn;

use crate::database::{map_tr_err, now_utc, Database};
use crate::models::{Channel, Message, MessageDirection, MessageStatus};

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, direction, status, content, sender, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let direction: String = row.get(2)?;
    let direction = direction.parse::<MessageDirection>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let status: String = row.get(3)?;
    let status = status.parse::<MessageStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        direction,
        status,
        content: row.get(4)?,
        sender: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a new message and return it with its assigned id.
pub async fn insert_message(
    db: &Database,
    conversation_id: i64,
    direction: MessageDirection,
    status: MessageStatus,
    content: String,
    sender: Option<String>,
) -> Result<Message, ConfabError> {
    let created_at = now_utc();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages
                    (conversation_id, direction, status, content, sender, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    conversation_id,
                    direction.to_string(),
                    status.to_string(),
                    content,
                    sender,
                    created_at,
                ],
            )?;
            Ok(Message {
                id: conn.last_insert_rowid(),
                conversation_id,
                direction,
                status,
                content,
                sender,
                created_at,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Atomically transition a single message to `status`.
///
/// A missing id is a benign race (the row's conversation was cascaded away,
/// or a concurrent consumer got there first): it is logged and swallowed,
/// never surfaced as a failure, because the caller has already committed the
/// work this transition describes.
pub async fn update_status(
    db: &Database,
    message_id: i64,
    status: MessageStatus,
) -> Result<(), ConfabError> {
    let rows = db
        .connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE messages SET status = ?1 WHERE id = ?2",
                params![status.to_string(), message_id],
            )?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;

    if rows == 0 {
        warn!(message_id, status = %status, "status update matched no row");
    }
    Ok(())
}

/// Get a message by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Message>, ConfabError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_message);
            match result {
                Ok(message) => Ok(Some(message)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch all messages with the given status and direction, oldest first.
pub async fn fetch_by_status(
    db: &Database,
    status: MessageStatus,
    direction: MessageDirection,
) -> Result<Vec<Message>, ConfabError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE status = ?1 AND direction = ?2
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(
                params![status.to_string(), direction.to_string()],
                row_to_message,
            )?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch unconsumed inbound messages for one channel, oldest first.
pub async fn fetch_unread_inbound(
    db: &Database,
    channel: Channel,
) -> Result<Vec<Message>, ConfabError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.conversation_id, m.direction, m.status,
                        m.content, m.sender, m.created_at
                 FROM messages m
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE m.status = 'received' AND m.direction = 'inbound'
                   AND c.channel = ?1
                 ORDER BY m.id ASC",
            )?;
            let rows = stmt.query_map(params![channel.to_string()], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Consume unread inbound messages for one channel.
///
/// One transaction selects every `received` inbound row on the channel,
/// transitions them all to `read`, and returns them. A consumed message is
/// never returned by a later unread fetch or consume call.
pub async fn consume_inbound(
    db: &Database,
    channel: Channel,
) -> Result<Vec<Message>, ConfabError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut messages = {
                let mut stmt = tx.prepare(
                    "SELECT m.id, m.conversation_id, m.direction, m.status,
                            m.content, m.sender, m.created_at
                     FROM messages m
                     JOIN conversations c ON c.id = m.conversation_id
                     WHERE m.status = 'received' AND m.direction = 'inbound'
                       AND c.channel = ?1
                     ORDER BY m.id ASC",
                )?;
                let rows = stmt.query_map(params![channel.to_string()], row_to_message)?;
                let mut messages = Vec::new();
                for row in rows {
                    messages.push(row?);
                }
                messages
            };

            for message in &mut messages {
                tx.execute(
                    "UPDATE messages SET status = 'read' WHERE id = ?1",
                    params![message.id],
                )?;
                message.status = MessageStatus::Read;
            }

            tx.commit()?;
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}
