//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A coached user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Account ID (UUID).
    pub id: String,
    /// Display name
    pub name: String,
    /// Linked Telegram chat, if any.
    pub telegram_chat_id: Option<String>,
    /// Pairing code shown in the web app.
    pub pairing_code: Option<String>,
    /// IANA timezone (e.g., "America/New_York").
    pub timezone: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl User {
    /// Display name, or a friendly fallback when blank.
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "friend"
        } else {
            name
        }
    }
}

/// Fields supplied when creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub timezone: Option<String>,
}

/// Goal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }
}

/// A user's goal. Title and description never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: GoalStatus,
    /// Optional target date (`YYYY-MM-DD`).
    pub end_date: Option<String>,
    pub created_at: String,
}

/// Fields supplied when creating a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub end_date: Option<String>,
}

/// One reflection row per (user, goal, local day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyReflection {
    pub id: i64,
    pub user_id: String,
    pub goal_id: String,
    /// Calendar date in the user's timezone (`YYYY-MM-DD`).
    pub local_date: String,
    pub mood: Option<String>,
    pub progress: Option<String>,
    pub stuck: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DailyReflection {
    /// The reflection fields as signals.
    pub fn signals(&self) -> ReflectionSignals {
        ReflectionSignals {
            mood: self.mood.clone(),
            progress: self.progress.clone(),
            stuck: self.stuck.clone(),
        }
    }
}

/// Partial reflection update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionSignals {
    pub mood: Option<String>,
    pub progress: Option<String>,
    pub stuck: Option<String>,
}

impl ReflectionSignals {
    /// Trim every field and turn blank strings into `None`.
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }
        Self {
            mood: clean(&self.mood),
            progress: clean(&self.progress),
            stuck: clean(&self.stuck),
        }
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        let n = self.normalized();
        n.mood.is_none() && n.progress.is_none() && n.stuck.is_none()
    }
}

/// Who authored a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Direction of a logged message relative to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// Channel tag for messages exchanged over Telegram.
pub const CHANNEL_TELEGRAM: &str = "telegram";

/// A message log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserMessage {
    pub id: i64,
    pub user_id: String,
    pub goal_id: Option<String>,
    pub role: MessageRole,
    pub direction: MessageDirection,
    pub channel: String,
    pub text: String,
    /// Free-form category tag (classifier category or prompt kind).
    pub category: Option<String>,
    /// Short summary of the message, if any.
    pub stored_label: Option<String>,
    pub created_at: String,
}

/// A message to append to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub user_id: String,
    pub goal_id: Option<String>,
    pub role: MessageRole,
    pub direction: MessageDirection,
    pub channel: String,
    pub text: String,
    pub category: Option<String>,
    pub stored_label: Option<String>,
}

impl NewMessage {
    /// A message received from the user over Telegram.
    pub fn incoming(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id: None,
            role: MessageRole::User,
            direction: MessageDirection::Incoming,
            channel: CHANNEL_TELEGRAM.to_string(),
            text: text.into(),
            category: None,
            stored_label: None,
        }
    }

    /// A message sent by the coach over Telegram.
    pub fn outgoing(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            direction: MessageDirection::Outgoing,
            ..Self::incoming(user_id, text)
        }
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.stored_label = label;
        self
    }
}

/// A user eligible to receive scheduled prompts, joined with their active goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PromptCandidate {
    pub user_id: String,
    pub name: String,
    pub telegram_chat_id: String,
    pub timezone: String,
    pub goal_id: String,
    pub goal_title: String,
    pub goal_description: String,
}
