//! Daily reflection operations.
//!
//! Rows are keyed by (user, goal, local date). Writes are single statements:
//! the anchor is an insert that ignores conflicts and a merge only overwrites
//! the fields it carries, so concurrent writers never lose each other's data.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{DailyReflection, ReflectionSignals};
use crate::time::{format_date, format_timestamp};

const REFLECTION_COLUMNS: &str =
    "id, user_id, goal_id, local_date, mood, progress, stuck, created_at, updated_at";

/// Make sure a reflection row exists for the day. Never touches an existing row.
///
/// Returns `true` when a row was created.
pub async fn upsert_anchor(
    pool: &SqlitePool,
    user_id: &str,
    goal_id: &str,
    local_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<bool> {
    let ts = format_timestamp(now);
    let result = sqlx::query(
        r#"
        INSERT INTO daily_reflections (user_id, goal_id, local_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, goal_id, local_date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(goal_id)
    .bind(format_date(local_date))
    .bind(&ts)
    .bind(&ts)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Merge signals into the day's reflection, creating the row if needed.
///
/// Absent or blank signals leave stored values untouched; present ones
/// overwrite them.
pub async fn merge_signals(
    pool: &SqlitePool,
    user_id: &str,
    goal_id: &str,
    local_date: NaiveDate,
    signals: &ReflectionSignals,
    now: DateTime<Utc>,
) -> Result<DailyReflection> {
    let signals = signals.normalized();
    let ts = format_timestamp(now);

    let reflection = sqlx::query_as::<_, DailyReflection>(&format!(
        r#"
        INSERT INTO daily_reflections
            (user_id, goal_id, local_date, mood, progress, stuck, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, goal_id, local_date) DO UPDATE SET
            mood = COALESCE(excluded.mood, daily_reflections.mood),
            progress = COALESCE(excluded.progress, daily_reflections.progress),
            stuck = COALESCE(excluded.stuck, daily_reflections.stuck),
            updated_at = excluded.updated_at
        RETURNING {REFLECTION_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(goal_id)
    .bind(format_date(local_date))
    .bind(&signals.mood)
    .bind(&signals.progress)
    .bind(&signals.stuck)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(pool)
    .await?;

    Ok(reflection)
}

/// Get the reflection for one day, if any.
pub async fn get_reflection(
    pool: &SqlitePool,
    user_id: &str,
    goal_id: &str,
    local_date: NaiveDate,
) -> Result<Option<DailyReflection>> {
    let reflection = sqlx::query_as::<_, DailyReflection>(&format!(
        r#"
        SELECT {REFLECTION_COLUMNS}
        FROM daily_reflections
        WHERE user_id = ? AND goal_id = ? AND local_date = ?
        "#
    ))
    .bind(user_id)
    .bind(goal_id)
    .bind(format_date(local_date))
    .fetch_optional(pool)
    .await?;
    Ok(reflection)
}

/// The most recent non-empty moods for a goal, newest first.
pub async fn recent_moods(
    pool: &SqlitePool,
    user_id: &str,
    goal_id: &str,
    limit: u32,
) -> Result<Vec<String>> {
    let moods: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT mood
        FROM daily_reflections
        WHERE user_id = ? AND goal_id = ? AND mood IS NOT NULL AND TRIM(mood) != ''
        ORDER BY local_date DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(goal_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(moods.into_iter().map(|(mood,)| mood).collect())
}

/// All reflections for a goal, newest day first.
pub async fn list_reflections(
    pool: &SqlitePool,
    user_id: &str,
    goal_id: &str,
) -> Result<Vec<DailyReflection>> {
    let reflections = sqlx::query_as::<_, DailyReflection>(&format!(
        r#"
        SELECT {REFLECTION_COLUMNS}
        FROM daily_reflections
        WHERE user_id = ? AND goal_id = ?
        ORDER BY local_date DESC
        "#
    ))
    .bind(user_id)
    .bind(goal_id)
    .fetch_all(pool)
    .await?;
    Ok(reflections)
}
