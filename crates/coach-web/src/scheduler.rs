//! Internal ticker for the scheduled prompt runs.
//!
//! Each tick runs the morning batch, then the evening batch. A run only
//! reaches users whose local hour matches, and the message log dedupes
//! repeats, so the interval only has to be shorter than an hour.

use std::time::Duration;

use coach::{Dispatcher, ScheduledRun};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Spawn the ticker.
pub fn spawn(dispatcher: Dispatcher, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = every.as_secs(), "Scheduler started");

        loop {
            ticker.tick().await;
            for run in [ScheduledRun::Morning, ScheduledRun::Evening] {
                if let Err(e) = dispatcher.run(run).await {
                    error!(run = %run, error = %e, "SCHEDULED_RUN_FAILED");
                }
            }
        }
    })
}
