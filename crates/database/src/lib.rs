//! SQLite persistence layer for the coaching bot.
//!
//! This crate provides async database operations for users, goals, daily
//! reflections and the message log using SQLx with SQLite. Timestamps are
//! passed in by the caller so that time stays under the caller's control.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, models::NewUser, user};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:coach.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a user
//!     let new_user = NewUser {
//!         name: "Bob".to_string(),
//!         timezone: Some("Europe/Berlin".to_string()),
//!     };
//!     let user = user::create_user(db.pool(), &new_user, chrono::Utc::now()).await?;
//!     let code = user::issue_pairing_code(db.pool(), &user.id).await?;
//!     println!("pairing code: {code}");
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod goal;
pub mod message_log;
pub mod models;
pub mod reflection;
pub mod time;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    DailyReflection, Goal, GoalStatus, MessageDirection, MessageRole, NewGoal, NewMessage,
    NewUser, PromptCandidate, ReflectionSignals, User, UserMessage, CHANNEL_TELEGRAM,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/coach.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect_in_memory().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Open a private in-memory database and run migrations.
    ///
    /// Every SQLite connection to `:memory:` is its own database, so the pool
    /// is pinned to a single connection that is never recycled.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::{now, test_db};

    #[tokio::test]
    async fn test_user_goal_reflection_flow() {
        let db = test_db().await;

        let user = user::create_user(
            db.pool(),
            &NewUser {
                name: "Alice".to_string(),
                timezone: Some("Europe/Paris".to_string()),
            },
            now(),
        )
        .await
        .unwrap();
        let goal = goal::create_goal(
            db.pool(),
            &NewGoal {
                user_id: user.id.clone(),
                title: "Learn piano".to_string(),
                description: "Play a full piece by December".to_string(),
                end_date: Some("2025-12-01".to_string()),
            },
            now(),
        )
        .await
        .unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        reflection::upsert_anchor(db.pool(), &user.id, &goal.id, date, now())
            .await
            .unwrap();
        let row = reflection::get_reflection(db.pool(), &user.id, &goal.id, date)
            .await
            .unwrap()
            .unwrap();
        assert!(row.signals().is_empty());

        let result = goal::create_goal(
            db.pool(),
            &NewGoal {
                user_id: "missing-user".to_string(),
                title: "x".to_string(),
                description: "y".to_string(),
                end_date: None,
            },
            now(),
        )
        .await;
        // Foreign keys are enforced.
        assert!(matches!(result, Err(DatabaseError::Sqlx(_))));
    }
}
