//! On-demand triggers for the scheduled prompt runs.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use coach::ScheduledRun;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::auth::secrets_match;
use crate::error::{Result, WebError};
use crate::state::AppState;

pub async fn morning(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    trigger(&state, &headers, ScheduledRun::Morning).await
}

pub async fn evening(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    trigger(&state, &headers, ScheduledRun::Evening).await
}

/// Run a batch now. A failed batch still answers `200 {"ok": true}`.
async fn trigger(state: &AppState, headers: &HeaderMap, run: ScheduledRun) -> Result<Json<Value>> {
    authorize(state, headers)?;

    match state.dispatcher.run(run).await {
        Ok(report) => Ok(Json(json!({ "ok": true, "run": run, "report": report }))),
        Err(e) => {
            error!(run = %run, error = %e, "CRON_RUN_FAILED");
            Ok(Json(json!({ "ok": true })))
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = state.cron_secret.as_deref() else {
        return Ok(());
    };

    let Some(value) = headers.get(header::AUTHORIZATION) else {
        warn!("Cron call without authorization");
        return Err(WebError::Unauthorized);
    };

    let Ok(value) = value.to_str() else {
        return Err(WebError::Unauthorized);
    };

    let Some(token) = value.strip_prefix("Bearer ") else {
        warn!("Cron authorization is not a bearer token");
        return Err(WebError::Unauthorized);
    };
    if !secrets_match(token, expected) {
        warn!("Cron secret mismatch");
        return Err(WebError::Unauthorized);
    }

    Ok(())
}
