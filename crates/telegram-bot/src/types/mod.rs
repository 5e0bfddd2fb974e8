//! Bot API types.

pub mod send;
pub mod update;

pub use send::{ParseMode, SendMessageParams, SetWebhookParams};
pub use update::{Chat, Message, TelegramUser, Update};

use serde::Deserialize;

/// Envelope wrapping every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}
