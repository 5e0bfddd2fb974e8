//! Inbound message pipeline.
//!
//! ```text
//! Telegram update
//!      ↓
//! linked chat? ── no ──> /start welcome | pairing code attempt
//!      ↓ yes
//! /start? ── yes ──> "already connected"
//!      ↓
//! active goal? ── no ──> guidance text
//!      ↓
//! classify ──> merge signals into today's reflection ──> generate reply
//!      ↓
//! send ──> log incoming + outgoing
//! ```
//!
//! Every failure is caught here: the user gets either no reply or a
//! generic apology, never an error string.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use brain_core::Brain;
use coach_database::{goal, message_log, reflection, user, Database, Goal, NewMessage, User};
use telegram_bot::Update;
use tracing::{debug, error, info, warn};

use crate::category::Category;
use crate::classifier::{Classifier, ClassifyInput};
use crate::clock::{local_date_or_utc, Clock};
use crate::config::CoachConfig;
use crate::dispatcher::Dispatcher;
use crate::error::CoachError;
use crate::goal_draft::{GoalDraft, GoalDrafter};
use crate::link::{bind_chat, is_start_command, LinkOutcome};
use crate::prompts::PromptSet;
use crate::reply::{ReplyContext, ReplyGenerator};
use crate::sender::{send_with_timeout, MessageSender};
use crate::texts::Texts;

/// Log category for conversational replies.
pub const REPLY_CATEGORY: &str = "mentor_reply";

/// Log category for guidance sent to users without an active goal.
pub const NO_GOAL_CATEGORY: &str = "no_active_goal";

/// Log category for apologies after a failed turn.
pub const APOLOGY_CATEGORY: &str = "apology";

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Not a text message; acknowledged and dropped.
    Ignored,
    /// Unlinked `/start`.
    Welcome,
    /// Linked `/start`.
    AlreadyConnected,
    /// Chat bound to `user_id`.
    Linked { user_id: String },
    /// Pairing code belongs to an account bound elsewhere.
    Conflict,
    /// Pairing code not found.
    UnknownCode,
    /// Linked user without an active goal.
    NoActiveGoal,
    /// Classified, reflected and answered.
    Replied { category: Category },
    /// The turn failed; see logs.
    Failed,
}

/// Run a model step with an upper time bound.
pub(crate) async fn with_model_timeout<T, F>(
    step: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, CoachError>
where
    F: Future<Output = Result<T, CoachError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CoachError::Timeout { step, after: limit }),
    }
}

/// The coaching service: owns the pipeline collaborators.
pub struct Coach {
    db: Database,
    classifier: Classifier,
    replies: Arc<ReplyGenerator>,
    goal_drafter: GoalDrafter,
    sender: Arc<dyn MessageSender>,
    clock: Arc<dyn Clock>,
    config: CoachConfig,
    texts: Texts,
}

impl Coach {
    /// Create a coach. The same brain serves classification and replies.
    pub fn new(
        db: Database,
        brain: Arc<dyn Brain>,
        prompts: &PromptSet,
        sender: Arc<dyn MessageSender>,
        clock: Arc<dyn Clock>,
        config: CoachConfig,
    ) -> Self {
        info!("Coach using brain: {}", brain.name());
        let texts = Texts::new(config.persona_name.clone(), config.web_url.clone());
        Self {
            db,
            classifier: Classifier::new(brain.clone(), prompts.classifier.clone()),
            goal_drafter: GoalDrafter::new(brain.clone(), prompts.goal_draft.clone()),
            replies: Arc::new(ReplyGenerator::new(brain, prompts)),
            sender,
            clock,
            config,
            texts,
        }
    }

    /// A dispatcher sharing this coach's collaborators.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.db.clone(),
            self.replies.clone(),
            self.sender.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    /// Turn a vague goal into a finite title and description.
    pub async fn draft_goal(&self, user_goal: &str) -> Result<GoalDraft, CoachError> {
        let today = self.clock.now().date_naive();
        with_model_timeout(
            "goal draft",
            self.config.model_timeout,
            self.goal_drafter.draft(user_goal, today),
        )
        .await
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Handle one webhook update.
    pub async fn handle_update(&self, update: &Update) -> HandleOutcome {
        let Some(message) = update.text_message() else {
            debug!(update_id = update.update_id, "Ignoring non-text update");
            return HandleOutcome::Ignored;
        };
        let Some(text) = message.text() else {
            return HandleOutcome::Ignored;
        };
        let sender_name = message.sender_name();
        self.handle_text(&message.chat_id(), text, sender_name.as_deref())
            .await
    }

    /// Handle one text message from a chat. Never fails; errors are logged.
    pub async fn handle_text(
        &self,
        chat_id: &str,
        text: &str,
        sender_name: Option<&str>,
    ) -> HandleOutcome {
        match self.try_handle_text(chat_id, text, sender_name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "PIPELINE_FAILED");
                HandleOutcome::Failed
            }
        }
    }

    async fn try_handle_text(
        &self,
        chat_id: &str,
        text: &str,
        sender_name: Option<&str>,
    ) -> Result<HandleOutcome, CoachError> {
        let text = text.trim();
        let linked = user::find_by_chat_id(self.db.pool(), chat_id).await?;

        let Some(user) = linked else {
            return self.handle_unlinked(chat_id, text, sender_name).await;
        };

        if is_start_command(text) {
            self.reply_fixed(chat_id, &self.texts.already_connected()).await?;
            return Ok(HandleOutcome::AlreadyConnected);
        }

        let Some(goal) = goal::active_goal(self.db.pool(), &user.id).await? else {
            self.log(NewMessage::incoming(&user.id, text)).await;
            self.reply_fixed(chat_id, &self.texts.no_active_goal()).await?;
            self.log(NewMessage::outgoing(&user.id, self.texts.no_active_goal()).with_category(NO_GOAL_CATEGORY))
                .await;
            return Ok(HandleOutcome::NoActiveGoal);
        };

        Ok(self.converse(chat_id, &user, &goal, text).await)
    }

    async fn handle_unlinked(
        &self,
        chat_id: &str,
        text: &str,
        sender_name: Option<&str>,
    ) -> Result<HandleOutcome, CoachError> {
        if is_start_command(text) {
            self.reply_fixed(chat_id, &self.texts.welcome()).await?;
            return Ok(HandleOutcome::Welcome);
        }

        match bind_chat(&self.db, chat_id, text, sender_name, self.config.sync_display_name).await {
            Ok(LinkOutcome::Linked(user)) => {
                self.reply_fixed(chat_id, &self.texts.linked(&user.name)).await?;
                Ok(HandleOutcome::Linked { user_id: user.id })
            }
            Ok(LinkOutcome::UnknownCode) => {
                self.reply_fixed(chat_id, &self.texts.code_not_found()).await?;
                Ok(HandleOutcome::UnknownCode)
            }
            Err(CoachError::ChannelConflict(_)) => {
                self.reply_fixed(chat_id, &self.texts.conflict()).await?;
                Ok(HandleOutcome::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    /// Classify, reflect, reply, log.
    async fn converse(&self, chat_id: &str, user: &User, goal: &Goal, text: &str) -> HandleOutcome {
        let input = ClassifyInput {
            name: &user.name,
            goal_title: &goal.title,
            goal_description: &goal.description,
            message: text,
        };

        let classification = match with_model_timeout(
            "classify",
            self.config.model_timeout,
            self.classifier.classify(&input),
        )
        .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "CLASSIFY_FAILED");
                // No reflection merge without a classification.
                self.log(NewMessage::incoming(&user.id, text).with_goal(&goal.id))
                    .await;
                self.apologize(chat_id, user, goal).await;
                return HandleOutcome::Failed;
            }
        };

        let category = classification.category;
        self.log(
            NewMessage::incoming(&user.id, text)
                .with_goal(&goal.id)
                .with_category(category.as_str())
                .with_label(classification.summary.clone()),
        )
        .await;

        let local_day = local_date_or_utc(user.timezone.as_deref(), self.clock.now());
        let merged = match reflection::merge_signals(
            self.db.pool(),
            &user.id,
            &goal.id,
            local_day,
            &classification.signals,
            self.clock.now(),
        )
        .await
        {
            Ok(row) => row.signals(),
            Err(e) => {
                error!(user_id = %user.id, error = %e, "REFLECTION_MERGE_FAILED");
                self.apologize(chat_id, user, goal).await;
                return HandleOutcome::Failed;
            }
        };
        debug!(user_id = %user.id, local_day = %local_day, "Reflection updated");

        let ctx = ReplyContext {
            name: &user.name,
            goal_title: &goal.title,
            goal_description: &goal.description,
            message: text,
            classification: &classification,
            reflection: &merged,
        };

        let reply = match with_model_timeout(
            "reply",
            self.config.model_timeout,
            self.replies.generate_reply(&ctx),
        )
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "REPLY_FAILED");
                self.apologize(chat_id, user, goal).await;
                return HandleOutcome::Failed;
            }
        };

        if let Err(e) = send_with_timeout(self.sender.as_ref(), chat_id, &reply, self.config.send_timeout).await {
            warn!(user_id = %user.id, error = %e, "REPLY_SEND_FAILED");
            return HandleOutcome::Failed;
        }

        self.log(
            NewMessage::outgoing(&user.id, &reply)
                .with_goal(&goal.id)
                .with_category(REPLY_CATEGORY),
        )
        .await;

        info!(user_id = %user.id, category = %category, "REPLY_SENT");
        HandleOutcome::Replied { category }
    }

    /// Send a fixed text; delivery failures propagate to the caller.
    async fn reply_fixed(&self, chat_id: &str, text: &str) -> Result<(), CoachError> {
        send_with_timeout(self.sender.as_ref(), chat_id, text, self.config.send_timeout).await
    }

    /// Best-effort apology after a failed turn.
    async fn apologize(&self, chat_id: &str, user: &User, goal: &Goal) {
        let text = self.texts.apology();
        match send_with_timeout(self.sender.as_ref(), chat_id, &text, self.config.send_timeout).await {
            Ok(()) => {
                self.log(
                    NewMessage::outgoing(&user.id, text)
                        .with_goal(&goal.id)
                        .with_category(APOLOGY_CATEGORY),
                )
                .await;
            }
            Err(e) => warn!(user_id = %user.id, error = %e, "Apology not delivered"),
        }
    }

    /// Append to the message log; failures are logged, not propagated.
    async fn log(&self, message: NewMessage) {
        if let Err(e) = message_log::append_message(self.db.pool(), &message, self.clock.now()).await {
            error!(user_id = %message.user_id, error = %e, "MESSAGE_LOG_FAILED");
        }
    }
}
