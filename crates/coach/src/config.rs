//! Coaching configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoachError;

/// Default persona name used in prompts and canned texts.
pub const DEFAULT_PERSONA_NAME: &str = "Tally";

/// Default local hour for morning prompts.
pub const DEFAULT_MORNING_HOUR: u32 = 9;

/// Default local hour for evening prompts.
pub const DEFAULT_EVENING_HOUR: u32 = 19;

/// Default timeout for a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(45);

/// Default timeout for a single outbound send.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of past moods fed into the morning prompt.
pub const DEFAULT_RECENT_MOOD_LIMIT: u32 = 5;

/// Default capacity of the inbound update queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default number of updates handled at the same time.
pub const DEFAULT_WORKER_CONCURRENCY: usize = 16;

/// Configuration for the coaching pipeline and dispatcher.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Name the coach introduces itself with.
    pub persona_name: String,
    /// Web app URL mentioned in guidance texts.
    pub web_url: Option<String>,
    /// Local hour (0-23) at which morning prompts go out.
    pub morning_hour: u32,
    /// Local hour (0-23) at which evening prompts go out.
    pub evening_hour: u32,
    /// Upper bound for each model call.
    pub model_timeout: Duration,
    /// Upper bound for each outbound send.
    pub send_timeout: Duration,
    /// Overwrite the account name with the Telegram name on linking.
    pub sync_display_name: bool,
    /// How many recent moods personalise the morning prompt.
    pub recent_mood_limit: u32,
    /// Bounded capacity of the update queue.
    pub queue_capacity: usize,
    /// Updates from different chats handled in parallel.
    pub worker_concurrency: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            persona_name: DEFAULT_PERSONA_NAME.to_string(),
            web_url: None,
            morning_hour: DEFAULT_MORNING_HOUR,
            evening_hour: DEFAULT_EVENING_HOUR,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            sync_display_name: false,
            recent_mood_limit: DEFAULT_RECENT_MOOD_LIMIT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_concurrency: DEFAULT_WORKER_CONCURRENCY,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, CoachError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CoachError::Config(format!("invalid {}: {}", key, value))),
        _ => Ok(None),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, CoachError> {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(CoachError::Config(format!("invalid {}: {}", key, value))),
        },
        Err(_) => Ok(None),
    }
}

impl CoachConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Reads `COACH_PERSONA_NAME`, `COACH_WEB_URL`, `MORNING_HOUR`,
    /// `EVENING_HOUR`, `MODEL_TIMEOUT_SECS`, `SEND_TIMEOUT_SECS`,
    /// `SYNC_DISPLAY_NAME`, `RECENT_MOOD_LIMIT`, `COACH_QUEUE_CAPACITY` and
    /// `COACH_WORKER_CONCURRENCY`.
    pub fn from_env() -> Result<Self, CoachError> {
        let mut config = Self::default();

        if let Ok(name) = env::var("COACH_PERSONA_NAME") {
            if !name.trim().is_empty() {
                config.persona_name = name.trim().to_string();
            }
        }
        if let Ok(url) = env::var("COACH_WEB_URL") {
            if !url.trim().is_empty() {
                config.web_url = Some(url.trim().to_string());
            }
        }
        if let Some(hour) = env_parse("MORNING_HOUR")? {
            config.morning_hour = hour;
        }
        if let Some(hour) = env_parse("EVENING_HOUR")? {
            config.evening_hour = hour;
        }
        if let Some(secs) = env_parse("MODEL_TIMEOUT_SECS")? {
            config.model_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse("SEND_TIMEOUT_SECS")? {
            config.send_timeout = Duration::from_secs(secs);
        }
        if let Some(sync) = env_bool("SYNC_DISPLAY_NAME")? {
            config.sync_display_name = sync;
        }
        if let Some(limit) = env_parse("RECENT_MOOD_LIMIT")? {
            config.recent_mood_limit = limit;
        }
        if let Some(capacity) = env_parse("COACH_QUEUE_CAPACITY")? {
            config.queue_capacity = capacity;
        }
        if let Some(concurrency) = env_parse("COACH_WORKER_CONCURRENCY")? {
            config.worker_concurrency = concurrency;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the dispatcher and queue cannot work with.
    pub fn validate(&self) -> Result<(), CoachError> {
        if self.morning_hour > 23 || self.evening_hour > 23 {
            return Err(CoachError::Config(format!(
                "prompt hours must be 0-23 (morning {}, evening {})",
                self.morning_hour, self.evening_hour
            )));
        }
        if self.queue_capacity == 0 {
            return Err(CoachError::Config("queue capacity must be positive".to_string()));
        }
        if self.worker_concurrency == 0 {
            return Err(CoachError::Config("worker concurrency must be positive".to_string()));
        }
        Ok(())
    }

    pub fn with_persona_name(mut self, name: impl Into<String>) -> Self {
        self.persona_name = name.into();
        self
    }

    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = Some(url.into());
        self
    }

    pub fn with_hours(mut self, morning: u32, evening: u32) -> Self {
        self.morning_hour = morning;
        self.evening_hour = evening;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_sync_display_name(mut self, sync: bool) -> Self {
        self.sync_display_name = sync;
        self
    }
}
