//! Application state shared across handlers.

use std::sync::Arc;

use coach::{Coach, Dispatcher, UpdateQueue};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Coaching service, for synchronous calls like goal drafting.
    pub coach: Arc<Coach>,
    /// Hand-off to the pipeline worker.
    pub queue: UpdateQueue,
    /// Scheduled prompt runner, shared with the ticker.
    pub dispatcher: Dispatcher,
    /// Expected webhook secret header.
    pub webhook_secret: Option<String>,
    /// Expected cron bearer token.
    pub cron_secret: Option<String>,
}

impl AppState {
    /// Create new application state.
    pub fn new(coach: Arc<Coach>, queue: UpdateQueue, dispatcher: Dispatcher) -> Self {
        Self {
            coach,
            queue,
            dispatcher,
            webhook_secret: None,
            cron_secret: None,
        }
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret;
        self
    }

    pub fn with_cron_secret(mut self, secret: Option<String>) -> Self {
        self.cron_secret = secret;
        self
    }
}
