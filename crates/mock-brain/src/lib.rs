//! Mock brain implementations for exercising the coaching pipeline.
//!
//! This crate provides implementations of the `Brain` trait for tests:
//! - `ScriptedBrain` - Replays queued completions and records every request
//! - `FailingBrain` - Always fails with a chosen error
//! - `DelayedBrain` - Wraps another brain with artificial delay
//!
//! For production use, see the `openai-brain` crate.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, CompletionRequest, ScriptedBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = ScriptedBrain::new(["first", "second"]);
//!
//!     let first = brain.complete(CompletionRequest::new("sys", "hi")).await?;
//!     assert_eq!(first.text, "first");
//!     assert_eq!(brain.requests().await.len(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, Completion, CompletionRequest};

pub use delayed::DelayedBrain;
pub use failing::FailingBrain;
pub use scripted::ScriptedBrain;
