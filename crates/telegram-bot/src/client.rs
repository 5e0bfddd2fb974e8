//! Telegram Bot API HTTP client.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::error::TelegramError;
use crate::types::{ApiResponse, Message, SendMessageParams, SetWebhookParams, TelegramUser};

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: BotConfig,
}

impl TelegramClient {
    /// Create a client. No network call is made.
    pub fn new(config: BotConfig) -> Result<Self, TelegramError> {
        if config.token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TelegramError::Http)?;

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, TelegramError> {
        Self::new(BotConfig::from_env()?)
    }

    /// Get the bot's own account. Useful as a token check at startup.
    pub async fn get_me(&self) -> Result<TelegramUser, TelegramError> {
        self.call::<(), _>("getMe", None).await
    }

    /// Send a message using the full params structure.
    ///
    /// The configured parse mode applies when the params don't set one.
    pub async fn send(&self, mut params: SendMessageParams) -> Result<Message, TelegramError> {
        if params.parse_mode.is_none() {
            params.parse_mode = self.config.parse_mode;
        }
        self.call("sendMessage", Some(params)).await
    }

    /// Send a text message to a chat.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<Message, TelegramError> {
        self.send(SendMessageParams::text(chat_id, text)).await
    }

    /// Register the webhook URL.
    pub async fn set_webhook(&self, params: SetWebhookParams) -> Result<bool, TelegramError> {
        let url = params.url.clone();
        let ok: bool = self.call("setWebhook", Some(params)).await?;
        info!("Webhook registered: {}", url);
        Ok(ok)
    }

    /// Remove the webhook.
    pub async fn delete_webhook(&self) -> Result<bool, TelegramError> {
        self.call::<(), _>("deleteWebhook", None).await
    }

    /// Get the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Call a Bot API method.
    ///
    /// Telegram reports failures with a non-2xx status and an `ok: false`
    /// body, so the body is decoded regardless of status.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<R, TelegramError> {
        let url = self.config.method_url(method);
        debug!("Bot API call: {}", method);

        let request = self.http.post(&url);
        let request = match &params {
            Some(p) => request.json(p),
            None => request,
        };

        let response = request.send().await.map_err(TelegramError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(TelegramError::Http)?;

        let parsed: ApiResponse<R> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                TelegramError::Json(e)
            } else {
                TelegramError::Api {
                    code: i32::from(status.as_u16()),
                    description: body.chars().take(200).collect(),
                }
            }
        })?;

        if !parsed.ok {
            return Err(TelegramError::Api {
                code: parsed.error_code.unwrap_or_else(|| i32::from(status.as_u16())),
                description: parsed
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        parsed.result.ok_or_else(|| TelegramError::Api {
            code: -1,
            description: format!("{} returned no result", method),
        })
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .finish()
    }
}
