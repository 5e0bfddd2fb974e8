//! Telegram Bot API client library.
//!
//! This crate provides a small Rust client for the parts of the Bot API the
//! coaching bot needs:
//!
//! - Sending text messages
//! - Registering and removing the webhook
//! - Decoding incoming webhook updates
//!
//! # Example
//!
//! ```no_run
//! use telegram_bot::{BotConfig, TelegramClient};
//!
//! # async fn example() -> Result<(), telegram_bot::TelegramError> {
//! let client = TelegramClient::new(BotConfig::new("123456:token"))?;
//!
//! let me = client.get_me().await?;
//! println!("Running as @{:?}", me.username);
//!
//! client.send_text("123456789", "Hello!").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::TelegramClient;
pub use config::BotConfig;
pub use error::TelegramError;
pub use types::*;

/// Header carrying the webhook secret on every update delivery.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";
