//! Scripted brain implementation - replays canned completions.

use std::collections::VecDeque;
use std::sync::Arc;

use brain_core::{async_trait, Brain, BrainError, Completion, CompletionRequest};
use tokio::sync::Mutex;

/// A brain that answers from a queue of canned outputs.
///
/// Every request is recorded so tests can assert on the prompts that were
/// sent (temperature, JSON mode, included context). When the queue runs dry
/// the brain answers with the fallback text if one is set, otherwise it
/// fails with [`BrainError::ProcessingFailed`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedBrain {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    fallback: Option<String>,
}

impl ScriptedBrain {
    /// Create a brain that answers with `responses` in order.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Into::into).collect())),
            ..Default::default()
        }
    }

    /// Create a brain that answers every request with the same text.
    pub fn repeating(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Default::default()
        }
    }

    /// Queue one more response.
    pub async fn push(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// All requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of queued responses not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.responses.lock().await.len()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, BrainError> {
        self.requests.lock().await.push(request);

        let next = self.responses.lock().await.pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(text) => Ok(Completion::text(text)),
            None => Err(BrainError::ProcessingFailed(
                "script exhausted".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
