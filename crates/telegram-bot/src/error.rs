//! Error types for telegram-bot.

use thiserror::Error;

/// Errors that can occur when talking to the Telegram Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Bot API answered with `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TelegramError {
    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TelegramError::Http(e) if e.is_timeout())
    }

    /// Whether the bot was blocked or the chat no longer exists.
    pub fn is_unreachable_chat(&self) -> bool {
        matches!(self, TelegramError::Api { code: 403, .. })
    }
}
