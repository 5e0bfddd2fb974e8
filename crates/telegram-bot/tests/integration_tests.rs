//! Integration tests for telegram-bot.
//!
//! Most tests run against a local stand-in for the Bot API. Tests marked
//! `#[ignore]` talk to the real API and need `TELEGRAM_BOT_TOKEN`:
//!   cargo test --test integration_tests -- --ignored

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use telegram_bot::{BotConfig, ParseMode, SetWebhookParams, TelegramClient, TelegramError};

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn bot_api(
    State(recorded): State<Recorded>,
    Path((token, method)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    recorded.calls.lock().unwrap().push((method.clone(), body.clone()));

    if token != "bot42:good" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        );
    }

    match method.as_str() {
        "getMe" => (
            StatusCode::OK,
            Json(json!({"ok": true, "result": {"id": 42, "is_bot": true, "first_name": "Coach", "username": "coach_bot"}})),
        ),
        "sendMessage" => {
            if body["chat_id"] == "404" {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
                );
            }
            if body["chat_id"] == "slow" {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            (
                StatusCode::OK,
                Json(json!({"ok": true, "result": {
                    "message_id": 99,
                    "date": 1717000000,
                    "chat": {"id": 7, "type": "private"},
                    "text": body["text"].clone()
                }})),
            )
        }
        "setWebhook" | "deleteWebhook" => (StatusCode::OK, Json(json!({"ok": true, "result": true}))),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"ok": false, "error_code": 404, "description": "Not Found"})),
        ),
    }
}

async fn spawn_api() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/:token/:method", post(bot_api))
        .with_state(recorded.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), recorded)
}

fn client(url: &str, token: &str) -> TelegramClient {
    TelegramClient::new(
        BotConfig::new(token)
            .with_api_url(url)
            .with_timeout(Duration::from_millis(500)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_get_me() {
    let (url, _) = spawn_api().await;
    let me = client(&url, "42:good").get_me().await.unwrap();
    assert_eq!(me.id, 42);
    assert!(me.is_bot);
    assert_eq!(me.username.as_deref(), Some("coach_bot"));
}

#[tokio::test]
async fn test_send_text() {
    let (url, recorded) = spawn_api().await;
    let message = client(&url, "42:good").send_text("7", "Good morning!").await.unwrap();
    assert_eq!(message.message_id, 99);
    assert_eq!(message.text.as_deref(), Some("Good morning!"));

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "sendMessage");
    assert_eq!(calls[0].1["chat_id"], "7");
    assert!(calls[0].1.get("parse_mode").is_none());
}

#[tokio::test]
async fn test_configured_parse_mode_applies() {
    let (url, recorded) = spawn_api().await;
    let client = TelegramClient::new(
        BotConfig::new("42:good")
            .with_api_url(&url)
            .with_parse_mode(ParseMode::Html),
    )
    .unwrap();
    client.send_text("7", "<b>hi</b>").await.unwrap();

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls[0].1["parse_mode"], "HTML");
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let (url, _) = spawn_api().await;
    let err = client(&url, "42:good").send_text("404", "hello").await.unwrap_err();
    match err {
        TelegramError::Api { code, description } => {
            assert_eq!(code, 400);
            assert!(description.contains("chat not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = client(&url, "42:bad").get_me().await.unwrap_err();
    assert!(matches!(err, TelegramError::Api { code: 401, .. }));
}

#[tokio::test]
async fn test_timeout() {
    let (url, _) = spawn_api().await;
    let err = client(&url, "42:good").send_text("slow", "hello").await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_webhook_registration() {
    let (url, recorded) = spawn_api().await;
    let client = client(&url, "42:good");

    let ok = client
        .set_webhook(SetWebhookParams::messages_only("https://coach.example/telegram/webhook").with_secret("abc"))
        .await
        .unwrap();
    assert!(ok);
    assert!(client.delete_webhook().await.unwrap());

    let calls = recorded.calls.lock().unwrap();
    assert_eq!(calls[0].0, "setWebhook");
    assert_eq!(calls[0].1["secret_token"], "abc");
    assert_eq!(calls[1].0, "deleteWebhook");
}

#[test]
fn test_empty_token_rejected() {
    let result = TelegramClient::new(BotConfig::new("  "));
    assert!(matches!(result, Err(TelegramError::Config(_))));
}

#[tokio::test]
#[ignore]
async fn test_real_get_me() {
    dotenvy::dotenv().ok();
    let client = TelegramClient::from_env().expect("TELEGRAM_BOT_TOKEN must be set");
    let me = client.get_me().await.unwrap();
    assert!(me.is_bot);
}
