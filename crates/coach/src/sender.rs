//! Message sender trait and implementations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use telegram_bot::{TelegramClient, TelegramError};
use tokio::time::timeout;
use tracing::warn;

use crate::error::CoachError;

/// Trait for delivering text to a chat.
///
/// Abstracted to support different transports (Telegram, tests, etc.)
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message to `chat_id`.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), CoachError>;
}

/// Send with an upper time bound. Timeouts surface as [`CoachError::Timeout`].
pub async fn send_with_timeout(
    sender: &dyn MessageSender,
    chat_id: &str,
    text: &str,
    limit: Duration,
) -> Result<(), CoachError> {
    match timeout(limit, sender.send_message(chat_id, text)).await {
        Ok(result) => result,
        Err(_) => Err(CoachError::Timeout {
            step: "send",
            after: limit,
        }),
    }
}

/// Sends through the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramSender {
    client: TelegramClient,
}

impl TelegramSender {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), CoachError> {
        self.client
            .send_text(chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| delivery_error(chat_id, e))
    }
}

/// Map a Bot API failure, flagging chats that blocked the bot or vanished.
fn delivery_error(chat_id: &str, e: TelegramError) -> CoachError {
    if e.is_unreachable_chat() {
        warn!(chat_id, error = %e, "CHAT_UNREACHABLE");
        CoachError::DeliveryFailure(format!("chat {} unreachable: {}", chat_id, e))
    } else if e.is_timeout() {
        warn!(chat_id, "TELEGRAM_SEND_TIMEOUT");
        CoachError::DeliveryFailure(format!("send to chat {} timed out: {}", chat_id, e))
    } else {
        CoachError::DeliveryFailure(e.to_string())
    }
}

/// A sender that records every delivery and can be told to fail for
/// specific chats.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `chat_id` fail.
    pub fn fail_for(&self, chat_id: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(chat_id.into());
        }
    }

    /// Stop failing sends to `chat_id`.
    pub fn recover(&self, chat_id: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(chat_id);
        }
    }

    /// Delivered `(chat_id, text)` pairs, oldest first.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Texts delivered to one chat, oldest first.
    pub fn sent_to(&self, chat_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(chat, _)| chat == chat_id)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), CoachError> {
        let fails = self
            .failing
            .lock()
            .map(|f| f.contains(chat_id))
            .unwrap_or(false);
        if fails {
            return Err(CoachError::DeliveryFailure(format!("chat {} unreachable", chat_id)));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push((chat_id.to_string(), text.to_string()));
        }
        Ok(())
    }
}
