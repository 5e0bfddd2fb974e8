//! Goal-coaching core.
//!
//! This crate turns free-form chat into structured daily reflections and
//! sends scheduled check-ins:
//!
//! - [`Classifier`] labels each message with a [`Category`] and extracts
//!   mood/progress/stuck signals
//! - signals are merged field by field into the user's reflection for their
//!   local day
//! - [`ReplyGenerator`] writes a short, gentle reply (and morning/evening
//!   prompts for the [`Dispatcher`])
//! - [`GoalDrafter`] turns a vague goal into a finite title and description
//! - [`Coach`] runs the whole inbound pipeline, including the pairing-code
//!   link protocol for new chats
//!
//! Storage, model and channel handles are injected; time comes from a
//! [`Clock`] so runs are reproducible in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coach::{Coach, CoachConfig, PromptSet, ScheduledRun, SystemClock, TelegramSender};
//!
//! let config = CoachConfig::from_env()?;
//! let prompts = PromptSet::load(&config.persona_name);
//! let coach = Coach::new(db, brain, &prompts, Arc::new(TelegramSender::new(telegram)), Arc::new(SystemClock), config);
//!
//! coach.handle_text("123456", "Ran 3k this morning!", None).await;
//! let report = coach.dispatcher().run(ScheduledRun::Morning).await?;
//! ```

pub mod category;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod goal_draft;
pub mod json;
pub mod link;
pub mod pipeline;
pub mod prompts;
pub mod queue;
pub mod reply;
pub mod sender;
pub mod texts;

pub use category::Category;
pub use classifier::{Classification, Classifier, ClassifyInput};
pub use clock::{current_hour, local_date, start_of_local_day, Clock, ManualClock, SystemClock};
pub use config::CoachConfig;
pub use dispatcher::{Dispatcher, RunReport, ScheduledRun};
pub use error::CoachError;
pub use goal_draft::{GoalDraft, GoalDrafter};
pub use link::LinkOutcome;
pub use pipeline::{Coach, HandleOutcome};
pub use prompts::{PromptKind, PromptSet};
pub use queue::UpdateQueue;
pub use reply::{ReplyGenerator, ReplyShape};
pub use sender::{MessageSender, RecordingSender, TelegramSender};
pub use texts::Texts;

// Re-export collaborator crates for convenience
pub use brain_core;
pub use coach_database as database;
pub use telegram_bot;
