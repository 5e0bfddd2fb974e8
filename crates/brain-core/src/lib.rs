//! Core trait and types for brain implementations.
//!
//! A "brain" is the language-model capability the coaching pipeline calls
//! into: a structured prompt goes in, free text comes out. This crate defines:
//!
//! - [`Brain`] - The trait that all brain implementations must implement
//! - [`CompletionRequest`] / [`Completion`] - Prompt input and model output
//! - [`BrainError`] - Error types for brain operations
//! - [`hash_prompt`] - Stable fingerprints for logging prompt versions
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, Completion, CompletionRequest};
//! use async_trait::async_trait;
//!
//! struct CannedBrain;
//!
//! #[async_trait]
//! impl Brain for CannedBrain {
//!     async fn complete(&self, request: CompletionRequest) -> Result<Completion, BrainError> {
//!         Ok(Completion::text("Hello!"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "CannedBrain"
//!     }
//! }
//! ```

mod error;
mod message;
mod prompt;
mod trait_def;

pub use error::BrainError;
pub use message::{Completion, CompletionRequest, TokenUsage};
pub use prompt::{hash_prompt, short_hash};
pub use trait_def::Brain;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
