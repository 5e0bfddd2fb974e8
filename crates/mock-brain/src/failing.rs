//! Failing brain implementation.

use brain_core::{async_trait, Brain, BrainError, Completion, CompletionRequest};

/// What kind of failure a [`FailingBrain`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    Processing,
}

/// A brain whose every call fails.
#[derive(Debug, Clone)]
pub struct FailingBrain {
    kind: FailureKind,
}

impl FailingBrain {
    /// A brain failing with a network error.
    pub fn network() -> Self {
        Self {
            kind: FailureKind::Network,
        }
    }

    /// A brain failing with a timeout.
    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
        }
    }

    /// A brain failing with a processing error.
    pub fn processing() -> Self {
        Self {
            kind: FailureKind::Processing,
        }
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, BrainError> {
        Err(match self.kind {
            FailureKind::Network => BrainError::Network("connection refused".to_string()),
            FailureKind::Timeout => BrainError::Timeout,
            FailureKind::Processing => BrainError::ProcessingFailed("model overloaded".to_string()),
        })
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_brain_kinds() {
        let request = CompletionRequest::new("sys", "hi");

        let err = FailingBrain::timeout().complete(request.clone()).await.unwrap_err();
        assert!(matches!(err, BrainError::Timeout));

        let err = FailingBrain::network().complete(request.clone()).await.unwrap_err();
        assert!(matches!(err, BrainError::Network(_)));

        let err = FailingBrain::processing().complete(request).await.unwrap_err();
        assert!(matches!(err, BrainError::ProcessingFailed(_)));
    }
}
