//! Telegram webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use coach::telegram_bot::{Update, SECRET_TOKEN_HEADER};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::secrets_match;
use crate::error::{Result, WebError};
use crate::state::AppState;

/// Accept one update and hand it to the pipeline worker.
///
/// Anything past the secret check is acknowledged with `{"ok": true}` so
/// Telegram does not redeliver: unparseable bodies and a full queue are
/// logged and dropped.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if !provided.is_some_and(|provided| secrets_match(provided, expected)) {
            warn!("Webhook secret mismatch");
            return Err(WebError::Unauthorized);
        }
    }

    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => {
            debug!(update_id = update.update_id, "Webhook update received");
            if let Err(e) = state.queue.enqueue(update) {
                warn!(error = %e, "WEBHOOK_ENQUEUE_FAILED");
            }
        }
        Err(e) => warn!(error = %e, "WEBHOOK_PARSE_FAILED"),
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
