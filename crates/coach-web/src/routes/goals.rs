//! Goal drafting for the web onboarding flow.

use axum::extract::State;
use axum::Json;
use coach::{CoachError, GoalDraft};
use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, WebError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftGoalRequest {
    pub user_goal: String,
}

/// Turn `{"userGoal": "..."}` into `{"goalTitle": ..., "goalDescription": ...}`.
pub async fn draft_goal(
    State(state): State<AppState>,
    Json(request): Json<DraftGoalRequest>,
) -> Result<Json<GoalDraft>> {
    match state.coach.draft_goal(&request.user_goal).await {
        Ok(draft) => Ok(Json(draft)),
        Err(CoachError::InvalidInput(reason)) => Err(WebError::BadRequest(reason)),
        Err(e) => {
            warn!(error = %e, "GOAL_DRAFT_FAILED");
            Err(WebError::Upstream("goal generation failed".to_string()))
        }
    }
}
