//! Goal operations.
//!
//! A user may hold at most one active goal. The check runs inside the write
//! statement itself so concurrent requests cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Goal, GoalStatus, NewGoal, PromptCandidate};
use crate::time::format_timestamp;
use crate::validation::validate_goal;

const GOAL_COLUMNS: &str = "id, user_id, title, description, status, end_date, created_at";

/// Create a new active goal.
///
/// Fails with `ActiveGoalExists` if the user already has one.
pub async fn create_goal(pool: &SqlitePool, new_goal: &NewGoal, now: DateTime<Utc>) -> Result<Goal> {
    validate_goal(&new_goal.title, &new_goal.description)?;

    let id = Uuid::new_v4().to_string();
    let result = sqlx::query(
        r#"
        INSERT INTO goals (id, user_id, title, description, status, end_date, created_at)
        SELECT ?, ?, ?, ?, 'active', ?, ?
        WHERE NOT EXISTS (
            SELECT 1 FROM goals WHERE user_id = ? AND status = 'active'
        )
        "#,
    )
    .bind(&id)
    .bind(&new_goal.user_id)
    .bind(new_goal.title.trim())
    .bind(new_goal.description.trim())
    .bind(&new_goal.end_date)
    .bind(format_timestamp(now))
    .bind(&new_goal.user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::ActiveGoalExists {
            user_id: new_goal.user_id.clone(),
        });
    }

    tracing::debug!(user_id = %new_goal.user_id, goal_id = %id, "Goal created");
    get_goal(pool, &id).await
}

/// Get a goal by ID.
pub async fn get_goal(pool: &SqlitePool, id: &str) -> Result<Goal> {
    sqlx::query_as::<_, Goal>(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Goal",
            id: id.to_string(),
        })
}

/// The user's active goal. If several exist, the oldest wins.
pub async fn active_goal(pool: &SqlitePool, user_id: &str) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(&format!(
        r#"
        SELECT {GOAL_COLUMNS}
        FROM goals
        WHERE user_id = ? AND status = 'active'
        ORDER BY created_at ASC, id ASC
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(goal)
}

/// List a user's goals, newest first.
pub async fn list_goals(pool: &SqlitePool, user_id: &str) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(goals)
}

/// Change a goal's status.
///
/// Reactivating a goal fails with `ActiveGoalExists` when another goal of the
/// same user is already active.
pub async fn set_goal_status(pool: &SqlitePool, goal_id: &str, status: GoalStatus) -> Result<()> {
    let result = match status {
        GoalStatus::Active => {
            sqlx::query(
                r#"
                UPDATE goals
                SET status = 'active'
                WHERE id = ?
                  AND NOT EXISTS (
                      SELECT 1 FROM goals other
                      WHERE other.user_id = goals.user_id
                        AND other.status = 'active'
                        AND other.id != goals.id
                  )
                "#,
            )
            .bind(goal_id)
            .execute(pool)
            .await?
        }
        GoalStatus::Completed | GoalStatus::Abandoned => {
            sqlx::query("UPDATE goals SET status = ? WHERE id = ?")
                .bind(status)
                .bind(goal_id)
                .execute(pool)
                .await?
        }
    };

    if result.rows_affected() == 0 {
        let goal = get_goal(pool, goal_id).await?;
        return Err(DatabaseError::ActiveGoalExists {
            user_id: goal.user_id,
        });
    }

    Ok(())
}

/// Users eligible for scheduled prompts: linked chat, timezone set and an
/// active goal. Each user appears once, paired with their oldest active goal.
pub async fn list_prompt_candidates(pool: &SqlitePool) -> Result<Vec<PromptCandidate>> {
    let candidates = sqlx::query_as::<_, PromptCandidate>(
        r#"
        SELECT
            u.id AS user_id,
            u.name AS name,
            u.telegram_chat_id AS telegram_chat_id,
            u.timezone AS timezone,
            g.id AS goal_id,
            g.title AS goal_title,
            g.description AS goal_description
        FROM users u
        JOIN goals g ON g.id = (
            SELECT g2.id FROM goals g2
            WHERE g2.user_id = u.id AND g2.status = 'active'
            ORDER BY g2.created_at ASC, g2.id ASC
            LIMIT 1
        )
        WHERE u.telegram_chat_id IS NOT NULL
          AND u.timezone IS NOT NULL
          AND TRIM(u.timezone) != ''
        ORDER BY u.created_at, u.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::test_support::{now, test_db};
    use crate::user;

    async fn make_user(db: &crate::Database, name: &str, tz: Option<&str>) -> String {
        user::create_user(
            db.pool(),
            &NewUser {
                name: name.to_string(),
                timezone: tz.map(str::to_string),
            },
            now(),
        )
        .await
        .unwrap()
        .id
    }

    fn goal_for(user_id: &str, title: &str) -> NewGoal {
        NewGoal {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: format!("{title} description"),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_second_active_goal_rejected() {
        let db = test_db().await;
        let user_id = make_user(&db, "Alice", None).await;

        let first = create_goal(db.pool(), &goal_for(&user_id, "Run"), now()).await.unwrap();
        assert_eq!(first.status, GoalStatus::Active);

        let second = create_goal(db.pool(), &goal_for(&user_id, "Read"), now()).await;
        assert!(matches!(second, Err(DatabaseError::ActiveGoalExists { .. })));
        assert_eq!(list_goals(db.pool(), &user_id).await.unwrap().len(), 1);

        // Completing the first frees the slot.
        set_goal_status(db.pool(), &first.id, GoalStatus::Completed).await.unwrap();
        let second = create_goal(db.pool(), &goal_for(&user_id, "Read"), now()).await.unwrap();
        let active = active_goal(db.pool(), &user_id).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);

        // And the first cannot be reactivated while the second is active.
        let reactivate = set_goal_status(db.pool(), &first.id, GoalStatus::Active).await;
        assert!(matches!(reactivate, Err(DatabaseError::ActiveGoalExists { .. })));
        assert_eq!(
            get_goal(db.pool(), &first.id).await.unwrap().status,
            GoalStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_set_status_missing_goal() {
        let db = test_db().await;
        let result = set_goal_status(db.pool(), "missing", GoalStatus::Abandoned).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reactivate_same_goal_is_allowed() {
        let db = test_db().await;
        let user_id = make_user(&db, "Alice", None).await;
        let goal = create_goal(db.pool(), &goal_for(&user_id, "Run"), now()).await.unwrap();

        set_goal_status(db.pool(), &goal.id, GoalStatus::Active).await.unwrap();
        set_goal_status(db.pool(), &goal.id, GoalStatus::Abandoned).await.unwrap();
        set_goal_status(db.pool(), &goal.id, GoalStatus::Active).await.unwrap();
        assert!(active_goal(db.pool(), &user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_prompt_candidates_filter() {
        let db = test_db().await;

        // Eligible: linked, timezone, active goal.
        let ready = make_user(&db, "Ready", Some("America/New_York")).await;
        user::link_chat(db.pool(), &ready, "1").await.unwrap();
        create_goal(db.pool(), &goal_for(&ready, "Run"), now()).await.unwrap();

        // No timezone.
        let no_tz = make_user(&db, "NoTz", None).await;
        user::link_chat(db.pool(), &no_tz, "2").await.unwrap();
        create_goal(db.pool(), &goal_for(&no_tz, "Run"), now()).await.unwrap();

        // Not linked.
        let unlinked = make_user(&db, "Unlinked", Some("UTC")).await;
        create_goal(db.pool(), &goal_for(&unlinked, "Run"), now()).await.unwrap();

        // No active goal.
        let idle = make_user(&db, "Idle", Some("UTC")).await;
        user::link_chat(db.pool(), &idle, "4").await.unwrap();
        let done = create_goal(db.pool(), &goal_for(&idle, "Run"), now()).await.unwrap();
        set_goal_status(db.pool(), &done.id, GoalStatus::Completed).await.unwrap();

        let candidates = list_prompt_candidates(db.pool()).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].user_id, ready);
        assert_eq!(candidates[0].telegram_chat_id, "1");
        assert_eq!(candidates[0].timezone, "America/New_York");
        assert_eq!(candidates[0].goal_title, "Run");
    }
}
