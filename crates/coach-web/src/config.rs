//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Default interval between scheduler ticks.
pub const DEFAULT_SCHEDULER_INTERVAL_SECS: u64 = 1800;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` value.
    pub webhook_secret: Option<String>,
    /// Public URL registered with Telegram at startup.
    pub webhook_url: Option<String>,
    /// Bearer token for the cron endpoints.
    pub cron_secret: Option<String>,
    /// Scheduler tick interval; `None` disables the internal ticker.
    pub scheduler_interval: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `COACH_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:coach.db?mode=rwc` |
    /// | `TELEGRAM_WEBHOOK_SECRET` | Webhook secret header value | (unset) |
    /// | `TELEGRAM_WEBHOOK_URL` | Webhook URL to register | (unset) |
    /// | `CRON_SECRET` | Bearer token for `/cron/*` | (unset) |
    /// | `SCHEDULER_INTERVAL_SECS` | Ticker interval, `0` disables | `1800` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("COACH_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:coach.db?mode=rwc".to_string());

        let interval_secs = match non_empty("SCHEDULER_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidInterval(raw))?,
            None => DEFAULT_SCHEDULER_INTERVAL_SECS,
        };

        Ok(Self {
            addr,
            database_url,
            webhook_secret: non_empty("TELEGRAM_WEBHOOK_SECRET"),
            webhook_url: non_empty("TELEGRAM_WEBHOOK_URL"),
            cron_secret: non_empty("CRON_SECRET"),
            scheduler_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid COACH_ADDR format")]
    InvalidAddr,

    #[error("Invalid SCHEDULER_INTERVAL_SECS: {0}")]
    InvalidInterval(String),
}
