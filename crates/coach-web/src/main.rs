//! HTTP front for the goal-coaching bot.
//!
//! Receives Telegram updates on a webhook, hands them to the pipeline worker,
//! and runs the morning/evening prompt batches on a ticker and on demand.

mod auth;
mod config;
mod error;
mod routes;
mod scheduler;
mod state;

use std::env;
use std::sync::Arc;

use coach::brain_core::Brain;
use coach::database::Database;
use coach::telegram_bot::{SetWebhookParams, TelegramClient};
use coach::{Coach, CoachConfig, PromptSet, SystemClock, TelegramSender, UpdateQueue};
use openai_brain::OpenAiBrain;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;
    let coach_config = CoachConfig::from_env()?;
    coach_config.validate()?;
    info!(addr = %config.addr, persona = %coach_config.persona_name, "Starting coach web server");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let brain: Arc<dyn Brain> = Arc::new(OpenAiBrain::from_env()?);
    let telegram = TelegramClient::from_env()?;

    if let Some(url) = config.webhook_url.as_deref() {
        let mut params = SetWebhookParams::messages_only(url);
        if let Some(secret) = config.webhook_secret.as_deref() {
            params = params.with_secret(secret);
        }
        match telegram.set_webhook(params).await {
            Ok(_) => info!(url = %url, "Webhook registered"),
            Err(e) => warn!(error = %e, "Webhook registration failed"),
        }
    }

    let prompts = PromptSet::load(&coach_config.persona_name);
    let queue_capacity = coach_config.queue_capacity;
    let worker_concurrency = coach_config.worker_concurrency;
    let coach = Arc::new(Coach::new(
        db.clone(),
        brain,
        &prompts,
        Arc::new(TelegramSender::new(telegram)),
        Arc::new(SystemClock),
        coach_config,
    ));

    let dispatcher = coach.dispatcher();
    let (queue, worker) = UpdateQueue::spawn(coach.clone(), queue_capacity, worker_concurrency);

    let ticker = config
        .scheduler_interval
        .map(|every| scheduler::spawn(dispatcher.clone(), every));

    let state = AppState::new(coach, queue, dispatcher)
        .with_webhook_secret(config.webhook_secret.clone())
        .with_cron_secret(config.cron_secret.clone());
    let app = routes::router().with_state(state);

    info!(addr = %config.addr, "Coach web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(ticker) = ticker {
        ticker.abort();
    }
    // The router held the last queue handle; let the worker drain.
    let _ = worker.await;
    db.close().await;
    info!("Coach web server stopped");

    Ok(())
}

/// `RUST_LOG` filter (default `info`); `LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
