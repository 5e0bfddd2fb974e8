//! User operations: accounts, channel links, pairing codes and timezones.

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User};
use crate::time::format_timestamp;
use crate::validation::{
    parse_timezone, validate_display_name, validate_pairing_code, PAIRING_CODE_LENGTH,
};

const USER_COLUMNS: &str = "id, name, telegram_chat_id, pairing_code, timezone, created_at";

/// Characters used in generated pairing codes (no 0/O or 1/I).
const PAIRING_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const PAIRING_ATTEMPTS: usize = 5;

/// Create a new user with a fresh ID.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser, now: DateTime<Utc>) -> Result<User> {
    validate_display_name(&new_user.name)?;
    let timezone = match new_user.timezone.as_deref() {
        Some(tz) => Some(parse_timezone(tz)?.name().to_string()),
        None => None,
    };

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO users (id, name, timezone, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new_user.name.trim())
    .bind(&timezone)
    .bind(format_timestamp(now))
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_unique(e, "User", &id))?;

    get_user(pool, &id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        })
}

/// Find the user linked to a Telegram chat.
pub async fn find_by_chat_id(pool: &SqlitePool, chat_id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE telegram_chat_id = ?"
    ))
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Find the user owning a pairing code.
pub async fn find_by_pairing_code(pool: &SqlitePool, code: &str) -> Result<Option<User>> {
    let code = code.trim();
    if validate_pairing_code(code).is_err() {
        return Ok(None);
    }
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE pairing_code = ?"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// List all users, oldest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Bind a Telegram chat to a user.
///
/// Succeeds when the user is unlinked or already linked to the same chat.
/// Fails with `AlreadyExists` when the user is bound to a different chat or
/// the chat is bound to a different user; nothing is written in that case.
pub async fn link_chat(pool: &SqlitePool, user_id: &str, chat_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET telegram_chat_id = ?
        WHERE id = ? AND (telegram_chat_id IS NULL OR telegram_chat_id = ?)
        "#,
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(chat_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_unique(e, "Telegram chat", chat_id))?;

    if result.rows_affected() == 0 {
        // Distinguish a missing user from one bound elsewhere.
        get_user(pool, user_id).await?;
        return Err(DatabaseError::AlreadyExists {
            entity: "Telegram link",
            id: user_id.to_string(),
        });
    }

    Ok(())
}

/// Remove a user's Telegram link so the pairing code can be used again.
pub async fn reset_channel_link(pool: &SqlitePool, user_id: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET telegram_chat_id = NULL WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    tracing::info!(user_id = %user_id, "Telegram link reset");
    Ok(())
}

fn generate_pairing_code() -> String {
    let mut rng = rand::thread_rng();
    (0..PAIRING_CODE_LENGTH)
        .map(|_| PAIRING_ALPHABET[rng.gen_range(0..PAIRING_ALPHABET.len())] as char)
        .collect()
}

/// Issue a fresh pairing code for a user, replacing any previous one.
pub async fn issue_pairing_code(pool: &SqlitePool, user_id: &str) -> Result<String> {
    for _ in 0..PAIRING_ATTEMPTS {
        let code = generate_pairing_code();
        let result = sqlx::query("UPDATE users SET pairing_code = ? WHERE id = ?")
            .bind(&code)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::from_unique(e, "Pairing code", &code));

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                return Err(DatabaseError::NotFound {
                    entity: "User",
                    id: user_id.to_string(),
                });
            }
            Ok(_) => return Ok(code),
            Err(DatabaseError::AlreadyExists { .. }) => {
                tracing::debug!(user_id = %user_id, "Pairing code collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(DatabaseError::AlreadyExists {
        entity: "Pairing code",
        id: user_id.to_string(),
    })
}

/// Set a user's timezone after validating the IANA name.
pub async fn set_timezone(pool: &SqlitePool, user_id: &str, timezone: &str) -> Result<()> {
    let tz = parse_timezone(timezone)?;

    let result = sqlx::query("UPDATE users SET timezone = ? WHERE id = ?")
        .bind(tz.name())
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    Ok(())
}

/// Update a user's display name.
pub async fn update_name(pool: &SqlitePool, user_id: &str, name: &str) -> Result<()> {
    validate_display_name(name)?;

    let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
        .bind(name.trim())
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    Ok(())
}
