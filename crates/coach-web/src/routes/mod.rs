//! Route handlers.

pub mod cron;
pub mod goals;
pub mod health;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/telegram/webhook", post(webhook::telegram_webhook))
        // Schedulers that can only GET are supported too.
        .route("/cron/morning", get(cron::morning).post(cron::morning))
        .route("/cron/evening", get(cron::evening).post(cron::evening))
        .route("/goals/draft", post(goals::draft_goal))
}
