//! Error types for coaching operations.

use std::time::Duration;

use brain_core::BrainError;
use coach_database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while coaching a user.
#[derive(Debug, Error)]
pub enum CoachError {
    /// Timezone string is not a valid IANA zone.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Classifier output could not be parsed or named an unknown category.
    #[error("classification parse error: {0}")]
    ClassificationParse(String),

    /// Goal draft output could not be parsed or failed validation.
    #[error("goal draft parse error: {0}")]
    GoalDraftParse(String),

    /// Caller-supplied input was rejected before any model call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reply or prompt generation produced nothing usable.
    #[error("reply generation failed: {0}")]
    ReplyGeneration(String),

    /// Pairing code belongs to a user linked to a different chat.
    #[error("channel conflict: {0}")]
    ChannelConflict(String),

    /// Outbound message could not be delivered.
    #[error("delivery failed: {0}")]
    DeliveryFailure(String),

    /// A model call or send exceeded its time budget.
    #[error("{step} timed out after {after:?}")]
    Timeout { step: &'static str, after: Duration },

    /// The update queue is full or closed.
    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Model call failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),
}
