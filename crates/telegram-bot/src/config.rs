//! Configuration types for telegram-bot.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::TelegramError;
use crate::types::ParseMode;

/// Default Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for the Bot API client.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token from BotFather.
    pub token: String,
    /// Base URL of the Bot API (e.g., "https://api.telegram.org").
    pub api_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Formatting applied to outgoing text. `None` sends plain text.
    pub parse_mode: Option<ParseMode>,
}

impl BotConfig {
    /// Create a new configuration with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            parse_mode: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `TELEGRAM_BOT_TOKEN` (required)
    /// - `TELEGRAM_API_URL` (default `https://api.telegram.org`)
    /// - `TELEGRAM_TIMEOUT_SECS` (default 20)
    /// - `TELEGRAM_PARSE_MODE` (`HTML`, `MarkdownV2`; default plain text)
    pub fn from_env() -> Result<Self, TelegramError> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TelegramError::Config("TELEGRAM_BOT_TOKEN not set".to_string()))?;

        let mut config = Self::new(token.trim());

        if let Ok(url) = env::var("TELEGRAM_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(secs) = env::var("TELEGRAM_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                TelegramError::Config(format!("invalid TELEGRAM_TIMEOUT_SECS: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Ok(mode) = env::var("TELEGRAM_PARSE_MODE") {
            config.parse_mode = match mode.trim() {
                "" | "none" | "plain" => None,
                other => Some(other.parse()?),
            };
        }

        Ok(config)
    }

    /// Override the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the parse mode for outgoing messages.
    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    /// Get the URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}
