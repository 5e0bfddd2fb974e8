//! Scheduled morning and evening prompts.
//!
//! A run picks every candidate whose local hour equals the run's target hour,
//! skips anyone who already received this run's category since their local
//! midnight, then generates, sends and logs one prompt per user. The log
//! entry is the dedupe guard, so it is only written after a successful send.

use std::fmt;
use std::sync::Arc;

use coach_database::{goal, message_log, reflection, Database, NewMessage, PromptCandidate};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::clock::{current_hour, local_date, start_of_local_day, Clock};
use crate::config::CoachConfig;
use crate::error::CoachError;
use crate::pipeline::with_model_timeout;
use crate::reply::{EveningContext, MorningContext, ReplyGenerator};
use crate::sender::{send_with_timeout, MessageSender};

/// Which scheduled prompt to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledRun {
    Morning,
    Evening,
}

impl ScheduledRun {
    /// Message-log category used for dedupe.
    pub fn category(&self) -> &'static str {
        match self {
            ScheduledRun::Morning => "morning_prompt",
            ScheduledRun::Evening => "evening_prompt",
        }
    }

    /// Local hour at which this run fires.
    pub fn target_hour(&self, config: &CoachConfig) -> u32 {
        match self {
            ScheduledRun::Morning => config.morning_hour,
            ScheduledRun::Evening => config.evening_hour,
        }
    }
}

impl fmt::Display for ScheduledRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduledRun::Morning => f.write_str("morning"),
            ScheduledRun::Evening => f.write_str("evening"),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Users with a linked chat, a timezone and an active goal.
    pub candidates: usize,
    /// Candidates whose local hour matched.
    pub eligible: usize,
    pub sent: usize,
    /// Eligible but already prompted today.
    pub already_sent: usize,
    /// Generation or delivery failed.
    pub failed: usize,
    /// Delivered, but the log write failed; counted in `sent` too. These
    /// users are not deduped and get prompted again on the next run.
    pub unlogged: usize,
    /// Skipped because the stored timezone is not valid.
    pub invalid_timezone: usize,
}

enum Delivery {
    Sent,
    SentUnlogged,
    AlreadySent,
}

/// Runs scheduled prompt batches.
#[derive(Clone)]
pub struct Dispatcher {
    db: Database,
    replies: Arc<ReplyGenerator>,
    sender: Arc<dyn MessageSender>,
    clock: Arc<dyn Clock>,
    config: CoachConfig,
    // Serialises overlapping runs (ticker and on-demand trigger).
    run_lock: Arc<Mutex<()>>,
}

impl Dispatcher {
    pub fn new(
        db: Database,
        replies: Arc<ReplyGenerator>,
        sender: Arc<dyn MessageSender>,
        clock: Arc<dyn Clock>,
        config: CoachConfig,
    ) -> Self {
        Self {
            db,
            replies,
            sender,
            clock,
            config,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run one batch. Per-user failures are counted, never propagated.
    pub async fn run(&self, kind: ScheduledRun) -> Result<RunReport, CoachError> {
        let _guard = self.run_lock.lock().await;
        let target = kind.target_hour(&self.config);
        let now = self.clock.now();

        let candidates = goal::list_prompt_candidates(self.db.pool()).await?;
        let mut report = RunReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for candidate in &candidates {
            let hour = match current_hour(&candidate.timezone, now) {
                Ok(hour) => hour,
                Err(e) => {
                    warn!(user_id = %candidate.user_id, error = %e, "DISPATCH_INVALID_TIMEZONE");
                    report.invalid_timezone += 1;
                    continue;
                }
            };
            if hour != target {
                continue;
            }
            report.eligible += 1;

            match self.dispatch_one(kind, candidate).await {
                Ok(Delivery::Sent) => report.sent += 1,
                Ok(Delivery::SentUnlogged) => {
                    report.sent += 1;
                    report.unlogged += 1;
                }
                Ok(Delivery::AlreadySent) => report.already_sent += 1,
                Err(e) => {
                    error!(user_id = %candidate.user_id, run = %kind, error = %e, "DISPATCH_FAILED");
                    report.failed += 1;
                }
            }
        }

        info!(
            run = %kind,
            candidates = report.candidates,
            eligible = report.eligible,
            sent = report.sent,
            already_sent = report.already_sent,
            failed = report.failed,
            unlogged = report.unlogged,
            invalid_timezone = report.invalid_timezone,
            "DISPATCH_RUN_COMPLETE"
        );
        Ok(report)
    }

    async fn dispatch_one(
        &self,
        kind: ScheduledRun,
        candidate: &PromptCandidate,
    ) -> Result<Delivery, CoachError> {
        let now = self.clock.now();
        let day_start = start_of_local_day(&candidate.timezone, now)?;

        if message_log::has_message_since(self.db.pool(), &candidate.user_id, kind.category(), day_start).await? {
            debug!(user_id = %candidate.user_id, run = %kind, "DISPATCH_ALREADY_SENT");
            return Ok(Delivery::AlreadySent);
        }

        let text = match kind {
            ScheduledRun::Morning => {
                let moods = reflection::recent_moods(
                    self.db.pool(),
                    &candidate.user_id,
                    &candidate.goal_id,
                    self.config.recent_mood_limit,
                )
                .await?;
                let ctx = MorningContext {
                    name: &candidate.name,
                    goal_title: &candidate.goal_title,
                    goal_description: &candidate.goal_description,
                    recent_moods: &moods,
                };
                with_model_timeout("morning", self.config.model_timeout, self.replies.morning_prompt(&ctx))
                    .await?
            }
            ScheduledRun::Evening => {
                let ctx = EveningContext {
                    name: &candidate.name,
                    goal_title: &candidate.goal_title,
                };
                with_model_timeout("evening", self.config.model_timeout, self.replies.evening_prompt(&ctx))
                    .await?
            }
        };

        // Undelivered prompts are not logged, so the next run retries.
        send_with_timeout(
            self.sender.as_ref(),
            &candidate.telegram_chat_id,
            &text,
            self.config.send_timeout,
        )
        .await?;

        let sent_at = self.clock.now();
        let logged = message_log::append_message(
            self.db.pool(),
            &NewMessage::outgoing(&candidate.user_id, &text)
                .with_goal(&candidate.goal_id)
                .with_category(kind.category()),
            sent_at,
        )
        .await;
        if let Err(e) = logged {
            error!(user_id = %candidate.user_id, run = %kind, error = %e, "DISPATCH_LOG_FAILED_AFTER_SEND");
            return Ok(Delivery::SentUnlogged);
        }

        if kind == ScheduledRun::Morning {
            let day = local_date(&candidate.timezone, sent_at)?;
            reflection::upsert_anchor(self.db.pool(), &candidate.user_id, &candidate.goal_id, day, sent_at)
                .await?;
        }

        info!(user_id = %candidate.user_id, run = %kind, "DISPATCH_SENT");
        Ok(Delivery::Sent)
    }
}
