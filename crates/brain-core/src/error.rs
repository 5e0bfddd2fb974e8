//! Error types for brain operations.

use thiserror::Error;

/// Errors that can occur during brain processing.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The brain is misconfigured (missing key, bad URL, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request could not reach the model backend.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered but the completion could not be produced.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The backend did not answer in time.
    #[error("processing timed out")]
    Timeout,
}
