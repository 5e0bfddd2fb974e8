//! Types for outgoing Bot API calls.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TelegramError;

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
}

impl FromStr for ParseMode {
    type Err = TelegramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ParseMode::Html),
            "markdownv2" => Ok(ParseMode::MarkdownV2),
            other => Err(TelegramError::Config(format!("unknown parse mode: {}", other))),
        }
    }
}

/// Parameters for `sendMessage`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SendMessageParams {
    /// Target chat ID (numeric IDs are accepted as strings).
    pub chat_id: String,

    /// The message text.
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,

    /// Reply to a specific message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_notification: bool,
}

impl SendMessageParams {
    /// Create params for a plain text message.
    pub fn text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn silent(mut self) -> Self {
        self.disable_notification = true;
        self
    }
}

/// Parameters for `setWebhook`.
#[derive(Debug, Clone, Serialize)]
pub struct SetWebhookParams {
    pub url: String,

    /// Echoed back in the `X-Telegram-Bot-Api-Secret-Token` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_updates: Vec<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub drop_pending_updates: bool,
}

impl SetWebhookParams {
    /// Webhook that only receives message updates.
    pub fn messages_only(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secret_token: None,
            allowed_updates: vec!["message".to_string()],
            drop_pending_updates: false,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret_token = Some(secret.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_params_serialization() {
        let params = SendMessageParams::text("42", "hello");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"chat_id": "42", "text": "hello"}));

        let params = SendMessageParams::text("42", "<b>hi</b>")
            .with_parse_mode(ParseMode::Html)
            .reply_to(7)
            .silent();
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["parse_mode"], "HTML");
        assert_eq!(value["reply_to_message_id"], 7);
        assert_eq!(value["disable_notification"], true);
    }

    #[test]
    fn test_webhook_params_serialization() {
        let params = SetWebhookParams::messages_only("https://example.com/telegram/webhook")
            .with_secret("s3cret");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["allowed_updates"], json!(["message"]));
        assert_eq!(value["secret_token"], "s3cret");
        assert!(value.get("drop_pending_updates").is_none());
    }

    #[test]
    fn test_parse_mode_from_str() {
        assert_eq!("html".parse::<ParseMode>().unwrap(), ParseMode::Html);
        assert_eq!("MarkdownV2".parse::<ParseMode>().unwrap(), ParseMode::MarkdownV2);
        assert!("Markdown".parse::<ParseMode>().is_err());
    }
}
