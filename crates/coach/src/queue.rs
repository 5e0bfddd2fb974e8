//! Hand-off between the webhook and the pipeline.
//!
//! The webhook only enqueues, so acknowledging Telegram never waits on model
//! calls. A dispatcher task drains the queue and spawns one task per update:
//! updates from different chats run in parallel (at most `concurrency` at a
//! time), while updates from the same chat wait for their predecessor so each
//! user's messages are still handled strictly in order.

use std::collections::HashMap;
use std::sync::Arc;

use telegram_bot::Update;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CoachError;
use crate::pipeline::Coach;

/// Sending half of the update queue.
#[derive(Debug, Clone)]
pub struct UpdateQueue {
    tx: mpsc::Sender<Update>,
}

impl UpdateQueue {
    /// Start the dispatcher task. It stops once every `UpdateQueue` clone is
    /// dropped, the queue is drained and every spawned update has finished.
    pub fn spawn(coach: Arc<Coach>, capacity: usize, concurrency: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Update>(capacity.max(1));
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));

        let handle = tokio::spawn(async move {
            info!(capacity, concurrency, "Update worker started");
            // Last task spawned for each chat.
            let mut tails: HashMap<String, JoinHandle<()>> = HashMap::new();

            while let Some(update) = rx.recv().await {
                tails.retain(|_, task| !task.is_finished());

                let key = update
                    .chat_id()
                    .unwrap_or_else(|| format!("update:{}", update.update_id));
                let previous = tails.remove(&key);
                let coach = coach.clone();
                let permits = permits.clone();

                let task = tokio::spawn(async move {
                    if let Some(previous) = previous {
                        let _ = previous.await;
                    }
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return;
                    };
                    let outcome = coach.handle_update(&update).await;
                    debug!(update_id = update.update_id, ?outcome, "Update processed");
                });
                tails.insert(key, task);
            }

            for (_, task) in tails.drain() {
                let _ = task.await;
            }
            info!("Update worker stopped");
        });

        (Self { tx }, handle)
    }

    /// Enqueue without waiting. Fails when the queue is full or closed.
    pub fn enqueue(&self, update: Update) -> Result<(), CoachError> {
        self.tx.try_send(update).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "queue closed",
            };
            warn!("Dropping update: {}", reason);
            CoachError::QueueUnavailable(reason.to_string())
        })
    }
}
