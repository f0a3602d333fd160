// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use confab_core::ConfabError;
use rusqlite::params;

use crate::database::{map_tr_err, now_utc, Database};
use crate::models::{Channel, Conversation};

const CONVERSATION_COLUMNS: &str =
    "id, user_identifier, channel, is_active, created_at, updated_at";

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    let channel: String = row.get(2)?;
    let channel = channel.parse::<Channel>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Conversation {
        id: row.get(0)?,
        user_identifier: row.get(1)?,
        channel,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn find_active(
    conn: &rusqlite::Connection,
    user_identifier: &str,
    channel: Channel,
) -> rusqlite::Result<Option<Conversation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations
         WHERE user_identifier = ?1 AND channel = ?2 AND is_active = 1"
    ))?;
    let result = stmt.query_row(
        params![user_identifier, channel.to_string()],
        row_to_conversation,
    );
    match result {
        Ok(conversation) => Ok(Some(conversation)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Find the active conversation for a (user, channel) pair, creating it if
/// none exists.
///
/// The lookup and insert run in one closure on the writer thread. A creator
/// that still loses a race observes the partial unique index firing and
/// re-reads the winner's row instead of surfacing the constraint violation.
pub async fn get_or_open(
    db: &Database,
    user_identifier: &str,
    channel: Channel,
) -> Result<Conversation, ConfabError> {
    let user_identifier = user_identifier.to_string();
    let now = now_utc();
    db.connection()
        .call(move |conn| {
            if let Some(existing) = find_active(conn, &user_identifier, channel)? {
                return Ok(existing);
            }

            let insert = conn.execute(
                "INSERT INTO conversations
                    (user_identifier, channel, is_active, created_at, updated_at)
                 VALUES (?1, ?2, 1, ?3, ?3)",
                params![user_identifier, channel.to_string(), now],
            );
            match insert {
                Ok(_) => Ok(Conversation {
                    id: conn.last_insert_rowid(),
                    user_identifier,
                    channel,
                    is_active: true,
                    created_at: now.clone(),
                    updated_at: now,
                }),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    // Lost the creation race: re-read the winner's row.
                    find_active(conn, &user_identifier, channel)?.ok_or_else(|| {
                        rusqlite::Error::UserFunctionError(
                            "active conversation vanished after constraint violation".into(),
                        )
                    })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Conversation>, ConfabError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_conversation);
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Close a conversation (flip `is_active` off).
///
/// Returns `true` when a row was updated. Closed conversations fall out of
/// the active-pair index, so the next inbound message from the same pair
/// opens a fresh conversation.
pub async fn close(db: &Database, id: i64) -> Result<bool, ConfabError> {
    let now = now_utc();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE conversations SET is_active = 0, updated_at = ?1 WHERE id = ?2",
                params![now, id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(map_tr_err)
}
