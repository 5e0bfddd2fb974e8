//! OpenAI-compatible brain implementation.
//!
//! This crate provides a [`Brain`] that sends each [`CompletionRequest`] to a
//! chat-completions endpoint (`/v1/chat/completions`). Any server speaking the
//! OpenAI wire format works: OpenAI itself, xAI, or a local proxy.
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_brain::{Brain, CompletionRequest, OpenAiBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = OpenAiBrain::from_env()?;
//!     let completion = brain
//!         .complete(CompletionRequest::new("You are kind.", "Say hi").with_temperature(0.0))
//!         .await?;
//!     println!("{}", completion.text);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::OpenAiBrain;
pub use config::OpenAiBrainConfig;

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, Completion, CompletionRequest};
