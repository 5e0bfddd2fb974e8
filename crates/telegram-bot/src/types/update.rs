//! Types for incoming updates delivered to the webhook.

use serde::{Deserialize, Serialize};

/// An incoming update. Only the fields the bot acts on are modelled;
/// everything else is ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,
}

impl Update {
    /// The new message carried by this update, if it has text.
    ///
    /// Edits and non-text messages (stickers, photos, ...) yield `None`.
    pub fn text_message(&self) -> Option<&Message> {
        self.message.as_ref().filter(|m| m.text().is_some())
    }

    /// Chat this update belongs to, if it carries a message or an edit.
    pub fn chat_id(&self) -> Option<String> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .map(Message::chat_id)
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<TelegramUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Message {
    /// Trimmed message text, if non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Chat ID as used for replies.
    pub fn chat_id(&self) -> String {
        self.chat.id.to_string()
    }

    /// Best display name for the sender.
    pub fn sender_name(&self) -> Option<String> {
        self.from
            .as_ref()
            .map(TelegramUser::full_name)
            .or_else(|| self.chat.first_name.clone())
            .filter(|n| !n.trim().is_empty())
    }
}

/// A chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    /// "private", "group", "supergroup" or "channel".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind == "private"
    }
}

/// A Telegram user or bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl TelegramUser {
    /// First and last name joined.
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => {
                format!("{} {}", self.first_name.trim(), last.trim())
            }
            _ => self.first_name.trim().to_string(),
        }
    }
}
