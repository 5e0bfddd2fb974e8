//! Turning a vague goal into a finite one.
//!
//! "Be healthier" becomes a concrete title ("Lose 3kg") plus a one or two
//! sentence description in the first person ("I will..."). The model answers
//! in JSON mode and the object is parsed as strictly as classifier output.

use std::sync::Arc;

use brain_core::{hash_prompt, Brain, CompletionRequest};
use chrono::NaiveDate;
use coach_database::validation::{validate_goal, MAX_DESCRIPTION_LENGTH};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CoachError;
use crate::json::strip_code_fence;

const GOAL_DRAFT_TEMPERATURE: f32 = 0.7;
const GOAL_DRAFT_MAX_TOKENS: u32 = 200;

/// A finite goal proposed from the user's own words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalDraft {
    #[serde(rename = "goalTitle")]
    pub title: String,
    #[serde(rename = "goalDescription")]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGoalDraft {
    goal_title: String,
    goal_description: String,
}

/// Parse `{"goalTitle": ..., "goalDescription": ...}`.
///
/// Both fields are required, must be non-blank and must fit the goal store's
/// length limits.
pub fn parse_goal_draft(response: &str) -> Result<GoalDraft, CoachError> {
    let raw: RawGoalDraft = serde_json::from_str(strip_code_fence(response)).map_err(|e| {
        CoachError::GoalDraftParse(format!("{}, response was: {}", e, response))
    })?;

    let draft = GoalDraft {
        title: raw.goal_title.trim().to_string(),
        description: raw.goal_description.trim().to_string(),
    };
    validate_goal(&draft.title, &draft.description)
        .map_err(|e| CoachError::GoalDraftParse(e.to_string()))?;
    Ok(draft)
}

/// Format the user-turn prompt.
pub fn format_goal_draft_input(user_goal: &str, today: NaiveDate) -> String {
    format!(
        "User goal: \"{}\"\nToday is: {}\n\nReturn ONLY a JSON object with the following fields:\n\
         {{\n  \"goalTitle\": string,\n  \"goalDescription\": string\n}}",
        user_goal,
        today.format("%Y-%m-%d")
    )
}

/// Drafts finite goals with a brain.
pub struct GoalDrafter {
    brain: Arc<dyn Brain>,
    system_prompt: String,
    prompt_hash: String,
}

impl GoalDrafter {
    pub fn new(brain: Arc<dyn Brain>, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let prompt_hash = hash_prompt(&system_prompt);
        Self {
            brain,
            system_prompt,
            prompt_hash,
        }
    }

    /// Draft a goal from free text.
    pub async fn draft(&self, user_goal: &str, today: NaiveDate) -> Result<GoalDraft, CoachError> {
        let user_goal = user_goal.trim();
        if user_goal.is_empty() {
            return Err(CoachError::InvalidInput("user goal is required".to_string()));
        }
        if user_goal.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CoachError::InvalidInput(format!(
                "user goal is longer than {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        let request = CompletionRequest::new(&self.system_prompt, format_goal_draft_input(user_goal, today))
            .with_temperature(GOAL_DRAFT_TEMPERATURE)
            .with_max_tokens(GOAL_DRAFT_MAX_TOKENS)
            .expect_json();

        let completion = self.brain.complete(request).await?;
        debug!("Goal draft raw output: {}", completion.text);

        match parse_goal_draft(&completion.text) {
            Ok(draft) => {
                info!(title = %draft.title, "GOAL_DRAFT_OK");
                Ok(draft)
            }
            Err(e) => {
                warn!(prompt_hash = %self.prompt_hash, error = %e, "GOAL_DRAFT_PARSE_FAILED");
                Err(e)
            }
        }
    }
}
