//! The Brain trait definition.

use async_trait::async_trait;

use crate::error::BrainError;
use crate::message::{Completion, CompletionRequest};

/// A language-model capability: one prompt in, one completion out.
///
/// Brains are stateless with respect to conversations; every request carries
/// its full prompt. This trait is object-safe and can be used as
/// `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Run a single completion.
    ///
    /// Implementations must honour `request.temperature` and
    /// `request.max_tokens` when the backend supports them.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process requests.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
