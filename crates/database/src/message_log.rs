//! Append-only message log.
//!
//! Every exchange is recorded here. Scheduled prompts also use the log as
//! their dedupe signal: a prompt category is sent at most once per local day.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{NewMessage, UserMessage};
use crate::time::format_timestamp;

/// Append a message. Returns the new row ID.
pub async fn append_message(pool: &SqlitePool, message: &NewMessage, now: DateTime<Utc>) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_messages
            (user_id, goal_id, role, direction, channel, text, category, stored_label, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&message.user_id)
    .bind(&message.goal_id)
    .bind(message.role)
    .bind(message.direction)
    .bind(&message.channel)
    .bind(&message.text)
    .bind(&message.category)
    .bind(&message.stored_label)
    .bind(format_timestamp(now))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Whether a message with `category` was logged for the user at or after `since`.
pub async fn has_message_since(
    pool: &SqlitePool,
    user_id: &str,
    category: &str,
    since: DateTime<Utc>,
) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT 1
        FROM user_messages
        WHERE user_id = ? AND category = ? AND created_at >= ?
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(category)
    .bind(format_timestamp(since))
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// The most recent messages for a user, newest first.
pub async fn list_messages(pool: &SqlitePool, user_id: &str, limit: u32) -> Result<Vec<UserMessage>> {
    let messages = sqlx::query_as::<_, UserMessage>(
        r#"
        SELECT id, user_id, goal_id, role, direction, channel, text, category, stored_label, created_at
        FROM user_messages
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(messages)
}
