//! Message classification.
//!
//! One model call turns a free-text message into a [`Category`], a short
//! summary and optional reflection signals. Output that does not match the
//! JSON contract is an error; it is never patched up with defaults.

use std::sync::Arc;

use brain_core::{hash_prompt, Brain, CompletionRequest};
use coach_database::ReflectionSignals;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::error::CoachError;
use crate::json::strip_code_fence;

/// Classifier output tokens are few.
const CLASSIFIER_MAX_TOKENS: u32 = 300;

/// What the classifier needs to know about the message.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    pub name: &'a str,
    pub goal_title: &'a str,
    pub goal_description: &'a str,
    pub message: &'a str,
}

/// A classified message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// One-sentence summary, stored as the message label.
    pub summary: Option<String>,
    pub signals: ReflectionSignals,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    category: String,
    #[serde(default, alias = "storedMessage")]
    summary: Option<String>,
    #[serde(alias = "dailyReflectionUpdate")]
    signals: RawSignals,
}

#[derive(Debug, Default, Deserialize)]
struct RawSignals {
    #[serde(default, alias = "morningMood")]
    mood: Option<String>,
    #[serde(default)]
    progress: Option<String>,
    #[serde(default)]
    stuck: Option<String>,
}

/// Parse classifier output against the JSON contract.
///
/// The whole response must be the object (optionally inside one fence);
/// surrounding prose or trailing characters are a parse error.
pub fn parse_classification(response: &str) -> Result<Classification, CoachError> {
    let json = strip_code_fence(response);

    let raw: RawClassification = serde_json::from_str(json).map_err(|e| {
        CoachError::ClassificationParse(format!("{}, response was: {}", e, response))
    })?;

    let category: Category = raw
        .category
        .parse()
        .map_err(CoachError::ClassificationParse)?;

    let summary = raw
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let signals = ReflectionSignals {
        mood: raw.signals.mood,
        progress: raw.signals.progress,
        stuck: raw.signals.stuck,
    }
    .normalized();

    Ok(Classification {
        category,
        summary,
        signals,
    })
}

/// Format the user-turn prompt for the classifier.
pub fn format_classifier_input(input: &ClassifyInput<'_>) -> String {
    format!(
        "User name: {}\nGoal: {}\nDescription: {}\n\nUser message:\n\"\"\"\n{}\n\"\"\"",
        display_name(input.name),
        input.goal_title,
        input.goal_description,
        input.message
    )
}

pub(crate) fn display_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() {
        "friend"
    } else {
        name
    }
}

/// Classifies messages with a brain at temperature 0.
pub struct Classifier {
    brain: Arc<dyn Brain>,
    system_prompt: String,
    prompt_hash: String,
}

impl Classifier {
    pub fn new(brain: Arc<dyn Brain>, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let prompt_hash = hash_prompt(&system_prompt);
        info!("Classifier prompt fingerprint: {}", prompt_hash);
        Self {
            brain,
            system_prompt,
            prompt_hash,
        }
    }

    /// Get the classifier prompt fingerprint.
    pub fn prompt_hash(&self) -> &str {
        &self.prompt_hash
    }

    /// Classify one message.
    pub async fn classify(&self, input: &ClassifyInput<'_>) -> Result<Classification, CoachError> {
        let request = CompletionRequest::new(&self.system_prompt, format_classifier_input(input))
            .with_temperature(0.0)
            .with_max_tokens(CLASSIFIER_MAX_TOKENS)
            .expect_json();

        let completion = self.brain.complete(request).await?;
        debug!("Classifier raw output: {}", completion.text);

        match parse_classification(&completion.text) {
            Ok(classification) => {
                info!(
                    category = %classification.category,
                    has_mood = classification.signals.mood.is_some(),
                    has_progress = classification.signals.progress.is_some(),
                    has_stuck = classification.signals.stuck.is_some(),
                    "CLASSIFIER_OK"
                );
                Ok(classification)
            }
            Err(e) => {
                warn!(
                    prompt_hash = %self.prompt_hash,
                    error = %e,
                    "CLASSIFIER_PARSE_FAILED"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_brain::ScriptedBrain;

    fn input() -> ClassifyInput<'static> {
        ClassifyInput {
            name: "Ana",
            goal_title: "Run a half marathon",
            goal_description: "Finish a half marathon in October",
            message: "Ran 5k today, legs are sore but I feel proud",
        }
    }

    #[test]
    fn test_parse_valid() {
        let raw = r#"{"category": "goal_progress_update", "summary": "Ran 5k", "signals": {"mood": "proud", "progress": "ran 5k", "stuck": null}}"#;
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.category, Category::GoalProgressUpdate);
        assert_eq!(c.summary.as_deref(), Some("Ran 5k"));
        assert_eq!(c.signals.mood.as_deref(), Some("proud"));
        assert_eq!(c.signals.progress.as_deref(), Some("ran 5k"));
        assert!(c.signals.stuck.is_none());
    }

    #[test]
    fn test_parse_blank_signals_become_none() {
        let raw = r#"{"category": "free_talk", "summary": " ", "signals": {"mood": "", "progress": "  "}}"#;
        let c = parse_classification(raw).unwrap();
        assert!(c.summary.is_none());
        assert!(c.signals.is_empty());
    }

    #[test]
    fn test_parse_wrapped_output() {
        let raw = "```json\n{\"category\": \"feeling_stuck\", \"summary\": \"Unmotivated\", \"signals\": {\"mood\": \"low\", \"progress\": null, \"stuck\": \"no motivation\"}}\n```";
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.category, Category::FeelingStuck);
        assert_eq!(c.signals.stuck.as_deref(), Some("no motivation"));
    }

    #[test]
    fn test_parse_legacy_field_names() {
        let raw = r#"{"category": "morning_motivation_reply", "storedMessage": "Feels good", "dailyReflectionUpdate": {"morningMood": "good", "progress": null, "stuck": null}}"#;
        let c = parse_classification(raw).unwrap();
        assert_eq!(c.signals.mood.as_deref(), Some("good"));
        assert_eq!(c.summary.as_deref(), Some("Feels good"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_classification("I think this is free talk"),
            Err(CoachError::ClassificationParse(_))
        ));
        assert!(matches!(
            parse_classification(r#"{"category": "motivation", "signals": {}}"#),
            Err(CoachError::ClassificationParse(_))
        ));
        // Missing signals object is not defaulted.
        assert!(matches!(
            parse_classification(r#"{"category": "free_talk", "summary": "hi"}"#),
            Err(CoachError::ClassificationParse(_))
        ));
        assert!(matches!(
            parse_classification(r#"{"summary": "hi", "signals": {}}"#),
            Err(CoachError::ClassificationParse(_))
        ));
        assert!(parse_classification("").is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_characters() {
        let raw = r#"{"category":"free_talk","summary":"hi","signals":{"mood":"ok"}}}} trailing garbage"#;
        assert!(matches!(
            parse_classification(raw),
            Err(CoachError::ClassificationParse(_))
        ));

        let raw = r#"{"category":"free_talk","summary":"hi","signals":{"mood":"ok"}}}"#;
        assert!(matches!(
            parse_classification(raw),
            Err(CoachError::ClassificationParse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_surrounding_prose() {
        let raw = r#"Sure! Here it is: {"category":"free_talk","summary":"hi","signals":{"mood":"ok"}} hope that helps"#;
        assert!(matches!(
            parse_classification(raw),
            Err(CoachError::ClassificationParse(_))
        ));

        let fenced_with_prose = "Here you go:\n```json\n{\"category\": \"free_talk\", \"signals\": {}}\n```";
        assert!(matches!(
            parse_classification(fenced_with_prose),
            Err(CoachError::ClassificationParse(_))
        ));
    }

    #[test]
    fn test_format_input() {
        let text = format_classifier_input(&ClassifyInput { name: " ", ..input() });
        assert!(text.starts_with("User name: friend\nGoal: Run a half marathon"));
        assert!(text.contains("Ran 5k today"));
    }

    #[tokio::test]
    async fn test_classify_uses_zero_temperature_and_json() {
        let brain = ScriptedBrain::new([
            r#"{"category": "goal_progress_update", "summary": "Ran 5k", "signals": {"mood": "proud", "progress": "ran 5k", "stuck": null}}"#,
        ]);
        let classifier = Classifier::new(Arc::new(brain.clone()), "system");

        let c = classifier.classify(&input()).await.unwrap();
        assert_eq!(c.category, Category::GoalProgressUpdate);

        let requests = brain.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(requests[0].json_output);
        assert_eq!(requests[0].system, "system");
        assert!(requests[0].user.contains("Run a half marathon"));
    }

    #[tokio::test]
    async fn test_classify_is_deterministic_for_same_output() {
        let raw = r#"{"category": "feeling_stuck", "summary": "Stuck", "signals": {"mood": null, "progress": null, "stuck": "time"}}"#;
        let brain = ScriptedBrain::repeating(raw);
        let classifier = Classifier::new(Arc::new(brain), "system");

        let a = classifier.classify(&input()).await.unwrap();
        let b = classifier.classify(&input()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_classify_propagates_errors() {
        let classifier = Classifier::new(Arc::new(ScriptedBrain::new(["not json"])), "system");
        assert!(matches!(
            classifier.classify(&input()).await,
            Err(CoachError::ClassificationParse(_))
        ));

        let classifier = Classifier::new(Arc::new(mock_brain::FailingBrain::network()), "system");
        assert!(matches!(classifier.classify(&input()).await, Err(CoachError::Brain(_))));
    }
}
