//! Shared fixtures for coach integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use brain_core::Brain;
use chrono::{DateTime, TimeZone, Utc};
use coach::database::{goal, user, Database, Goal, NewGoal, NewUser, User};
use coach::{Coach, CoachConfig, ManualClock, PromptSet, RecordingSender};

pub struct Harness {
    pub db: Database,
    pub coach: Coach,
    pub sender: RecordingSender,
    pub clock: ManualClock,
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub async fn harness(brain: Arc<dyn Brain>, start: DateTime<Utc>) -> Harness {
    harness_with_config(brain, start, CoachConfig::default()).await
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn harness_with_config(
    brain: Arc<dyn Brain>,
    start: DateTime<Utc>,
    config: CoachConfig,
) -> Harness {
    init_tracing();
    let db = Database::connect_in_memory().await.unwrap();
    let sender = RecordingSender::new();
    let clock = ManualClock::new(start);
    let prompts = PromptSet::defaults(&config.persona_name);
    let coach = Coach::new(
        db.clone(),
        brain,
        &prompts,
        Arc::new(sender.clone()),
        Arc::new(clock.clone()),
        config,
    );
    Harness {
        db,
        coach,
        sender,
        clock,
    }
}

/// A user with a timezone, an active goal and optionally a linked chat.
pub async fn coached_user(
    db: &Database,
    name: &str,
    timezone: &str,
    chat_id: Option<&str>,
) -> (User, Goal) {
    let u = user::create_user(
        db.pool(),
        &NewUser {
            name: name.to_string(),
            timezone: Some(timezone.to_string()),
        },
        utc(2025, 1, 1, 0, 0),
    )
    .await
    .unwrap();
    if let Some(chat_id) = chat_id {
        user::link_chat(db.pool(), &u.id, chat_id).await.unwrap();
    }
    let g = goal::create_goal(
        db.pool(),
        &NewGoal {
            user_id: u.id.clone(),
            title: "Run a half marathon".to_string(),
            description: "Finish a half marathon in October".to_string(),
            end_date: None,
        },
        utc(2025, 1, 1, 0, 0),
    )
    .await
    .unwrap();
    let u = user::get_user(db.pool(), &u.id).await.unwrap();
    (u, g)
}

pub fn classification(category: &str, mood: Option<&str>, progress: Option<&str>, stuck: Option<&str>) -> String {
    serde_json::json!({
        "category": category,
        "summary": format!("{category} message"),
        "signals": {"mood": mood, "progress": progress, "stuck": stuck}
    })
    .to_string()
}
