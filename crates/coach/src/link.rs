//! Binding a Telegram chat to an account with a pairing code.
//!
//! A chat is UNLINKED until it sends a code that belongs to an account with
//! no chat (or this chat) bound. Failed attempts never mutate state.

use coach_database::{user, Database, DatabaseError, User};
use tracing::{info, warn};

use crate::error::CoachError;

/// Whether the text is the `/start` command (optionally addressed `/start@bot`).
pub fn is_start_command(text: &str) -> bool {
    match text.split_whitespace().next() {
        Some(command) => command == "/start" || command.starts_with("/start@"),
        None => false,
    }
}

/// Result of a pairing attempt that did not conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The chat is now bound to this user.
    Linked(User),
    /// No account has this code.
    UnknownCode,
}

/// Try to bind `chat_id` using `code`.
///
/// Fails with [`CoachError::ChannelConflict`] when the code's account is
/// already bound to a different chat.
pub async fn bind_chat(
    db: &Database,
    chat_id: &str,
    code: &str,
    sender_name: Option<&str>,
    sync_display_name: bool,
) -> Result<LinkOutcome, CoachError> {
    let Some(owner) = user::find_by_pairing_code(db.pool(), code).await? else {
        info!(chat_id = %chat_id, "LINK_UNKNOWN_CODE");
        return Ok(LinkOutcome::UnknownCode);
    };

    if let Some(bound) = owner.telegram_chat_id.as_deref() {
        if bound != chat_id {
            warn!(user_id = %owner.id, chat_id = %chat_id, "LINK_CONFLICT");
            return Err(CoachError::ChannelConflict(format!(
                "account {} is linked to another chat",
                owner.id
            )));
        }
    }

    match user::link_chat(db.pool(), &owner.id, chat_id).await {
        Ok(()) => {}
        Err(DatabaseError::AlreadyExists { .. }) => {
            // Lost a race with another chat using the same code.
            warn!(user_id = %owner.id, chat_id = %chat_id, "LINK_CONFLICT");
            return Err(CoachError::ChannelConflict(format!(
                "account {} is linked to another chat",
                owner.id
            )));
        }
        Err(e) => return Err(e.into()),
    }

    if sync_display_name {
        if let Some(name) = sender_name.map(str::trim).filter(|n| !n.is_empty()) {
            if let Err(e) = user::update_name(db.pool(), &owner.id, name).await {
                warn!(user_id = %owner.id, error = %e, "Display name sync failed");
            }
        }
    }

    info!(user_id = %owner.id, chat_id = %chat_id, "LINK_OK");
    Ok(LinkOutcome::Linked(user::get_user(db.pool(), &owner.id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coach_database::NewUser;

    async fn setup() -> (Database, User, String) {
        let db = Database::connect_in_memory().await.unwrap();
        let u = user::create_user(
            db.pool(),
            &NewUser {
                name: "Ana".to_string(),
                timezone: None,
            },
            Utc::now(),
        )
        .await
        .unwrap();
        let code = user::issue_pairing_code(db.pool(), &u.id).await.unwrap();
        (db, u, code)
    }

    #[test]
    fn test_is_start_command() {
        assert!(is_start_command("/start"));
        assert!(is_start_command("  /start  "));
        assert!(is_start_command("/start@coach_bot"));
        assert!(is_start_command("/start payload"));
        assert!(!is_start_command("/starting"));
        assert!(!is_start_command("start"));
        assert!(!is_start_command(""));
    }

    #[tokio::test]
    async fn test_bind_and_rebind_same_chat() {
        let (db, u, code) = setup().await;

        let outcome = bind_chat(&db, "100", &code, Some("Ana Silva"), false).await.unwrap();
        match outcome {
            LinkOutcome::Linked(linked) => {
                assert_eq!(linked.id, u.id);
                assert_eq!(linked.telegram_chat_id.as_deref(), Some("100"));
                assert_eq!(linked.name, "Ana");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        // Same chat again is fine.
        assert!(matches!(
            bind_chat(&db, "100", &code, None, false).await.unwrap(),
            LinkOutcome::Linked(_)
        ));
    }

    #[tokio::test]
    async fn test_conflict_leaves_state_unchanged() {
        let (db, u, code) = setup().await;
        bind_chat(&db, "100", &code, None, false).await.unwrap();

        let result = bind_chat(&db, "200", &code, None, false).await;
        assert!(matches!(result, Err(CoachError::ChannelConflict(_))));

        let fetched = user::get_user(db.pool(), &u.id).await.unwrap();
        assert_eq!(fetched.telegram_chat_id.as_deref(), Some("100"));
        assert!(user::find_by_chat_id(db.pool(), "200").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_code() {
        let (db, u, _) = setup().await;
        let outcome = bind_chat(&db, "100", "NOPE1234", None, false).await.unwrap();
        assert_eq!(outcome, LinkOutcome::UnknownCode);
        assert!(user::get_user(db.pool(), &u.id).await.unwrap().telegram_chat_id.is_none());
    }

    #[tokio::test]
    async fn test_display_name_sync() {
        let (db, _, code) = setup().await;
        let outcome = bind_chat(&db, "100", &code, Some("Ana Silva"), true).await.unwrap();
        match outcome {
            LinkOutcome::Linked(linked) => assert_eq!(linked.name, "Ana Silva"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
