//! Scheduled prompt runs.

mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use coach::database::{message_log, reflection, MessageDirection, ReflectionSignals};
use coach::{RunReport, ScheduledRun};
use common::{coached_user, harness, utc};
use mock_brain::{FailingBrain, ScriptedBrain};

#[tokio::test]
async fn morning_prompt_is_sent_once_per_local_day() {
    let brain = ScriptedBrain::repeating("Good morning Ana! What is one small step for your run today?");
    // 14:00 UTC = 09:00 in New York.
    let h = harness(Arc::new(brain.clone()), utc(2025, 1, 15, 14, 0)).await;
    let (u, g) = coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;
    let dispatcher = h.coach.dispatcher();

    let report = dispatcher.run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(
        report,
        RunReport {
            candidates: 1,
            eligible: 1,
            sent: 1,
            ..Default::default()
        }
    );
    assert_eq!(h.sender.sent_to("100").len(), 1);

    let log = message_log::list_messages(h.db.pool(), &u.id, 10).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].direction, MessageDirection::Outgoing);
    assert_eq!(log[0].category.as_deref(), Some("morning_prompt"));

    let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let anchor = reflection::get_reflection(h.db.pool(), &u.id, &g.id, day)
        .await
        .unwrap()
        .unwrap();
    assert!(anchor.signals().is_empty());

    // Same local hour, twenty minutes later.
    h.clock.advance(Duration::minutes(20));
    let report = dispatcher.run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.already_sent, 1);
    assert_eq!(h.sender.sent_to("100").len(), 1);
    assert_eq!(brain.requests().await.len(), 1);

    // Next local morning.
    h.clock.set(utc(2025, 1, 16, 14, 5));
    let report = dispatcher.run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(h.sender.sent_to("100").len(), 2);
}

#[tokio::test]
async fn morning_prompt_includes_recent_moods() {
    let brain = ScriptedBrain::repeating("Morning! Yesterday sounded tiring. Gentle start today?");
    let h = harness(Arc::new(brain.clone()), utc(2025, 1, 15, 14, 0)).await;
    let (u, g) = coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;

    reflection::merge_signals(
        h.db.pool(),
        &u.id,
        &g.id,
        NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
        &ReflectionSignals {
            mood: Some("exhausted".to_string()),
            ..Default::default()
        },
        utc(2025, 1, 14, 20, 0),
    )
    .await
    .unwrap();

    h.coach.dispatcher().run(ScheduledRun::Morning).await.unwrap();

    let requests = brain.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user.contains("- exhausted"));
}

#[tokio::test]
async fn wrong_local_hour_is_not_eligible() {
    let brain = ScriptedBrain::repeating("unused");
    // 09:00 UTC = 04:00 in New York.
    let h = harness(Arc::new(brain.clone()), utc(2025, 1, 15, 9, 0)).await;
    coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;

    let report = h.coach.dispatcher().run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.candidates, 1);
    assert_eq!(report.eligible, 0);
    assert!(h.sender.sent().is_empty());
    assert!(brain.requests().await.is_empty());
}

#[tokio::test]
async fn evening_run_targets_each_users_local_evening() {
    let brain = ScriptedBrain::repeating("How did today go?\nDid you get a run in?");
    // 00:00 UTC on the 16th = 19:00 on the 15th in New York, 09:00 in Tokyo.
    let h = harness(Arc::new(brain), utc(2025, 1, 16, 0, 0)).await;
    let (ny, ny_goal) = coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;
    coached_user(&h.db, "Ken", "Asia/Tokyo", Some("300")).await;

    let report = h.coach.dispatcher().run(ScheduledRun::Evening).await.unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.eligible, 1);
    assert_eq!(report.sent, 1);
    assert_eq!(h.sender.sent_to("100").len(), 1);
    assert!(h.sender.sent_to("300").is_empty());

    let log = message_log::list_messages(h.db.pool(), &ny.id, 10).await.unwrap();
    assert_eq!(log[0].category.as_deref(), Some("evening_prompt"));

    // Evening prompts do not anchor a reflection.
    let reflections = reflection::list_reflections(h.db.pool(), &ny.id, &ny_goal.id)
        .await
        .unwrap();
    assert!(reflections.is_empty());
}

#[tokio::test]
async fn failed_delivery_is_retried_next_run() {
    let brain = ScriptedBrain::repeating("Good morning!");
    let h = harness(Arc::new(brain), utc(2025, 1, 15, 14, 0)).await;
    let (u, g) = coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;
    let dispatcher = h.coach.dispatcher();

    h.sender.fail_for("100");
    let report = dispatcher.run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);
    assert!(message_log::list_messages(h.db.pool(), &u.id, 10).await.unwrap().is_empty());
    assert!(reflection::list_reflections(h.db.pool(), &u.id, &g.id).await.unwrap().is_empty());

    h.sender.recover("100");
    h.clock.advance(Duration::minutes(10));
    let report = dispatcher.run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(h.sender.sent_to("100"), vec!["Good morning!"]);
}

#[tokio::test]
async fn model_failure_is_counted_not_sent() {
    let h = harness(Arc::new(FailingBrain::network()), utc(2025, 1, 15, 14, 0)).await;
    let (u, _) = coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;

    let report = h.coach.dispatcher().run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.eligible, 1);
    assert_eq!(report.failed, 1);
    assert!(h.sender.sent().is_empty());
    assert!(message_log::list_messages(h.db.pool(), &u.id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_timezone_is_skipped_and_counted() {
    let brain = ScriptedBrain::repeating("Good morning!");
    let h = harness(Arc::new(brain), utc(2025, 1, 15, 14, 0)).await;
    let (broken, _) = coached_user(&h.db, "Bo", "America/New_York", Some("200")).await;
    coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;

    sqlx::query("UPDATE users SET timezone = 'Mars/Olympus_Mons' WHERE id = ?")
        .bind(&broken.id)
        .execute(h.db.pool())
        .await
        .unwrap();

    let report = h.coach.dispatcher().run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.invalid_timezone, 1);
    assert_eq!(report.sent, 1);
    assert!(h.sender.sent_to("200").is_empty());
    assert_eq!(h.sender.sent_to("100").len(), 1);
}

#[tokio::test]
async fn unlinked_users_are_not_candidates() {
    let brain = ScriptedBrain::repeating("Good morning!");
    let h = harness(Arc::new(brain), utc(2025, 1, 15, 14, 0)).await;
    coached_user(&h.db, "Ana", "America/New_York", None).await;

    let report = h.coach.dispatcher().run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(report, RunReport::default());
}

#[tokio::test]
async fn log_failure_after_send_is_reported_separately() {
    let brain = ScriptedBrain::repeating("Good morning!");
    let h = harness(Arc::new(brain), utc(2025, 1, 15, 14, 0)).await;
    let (u, _) = coached_user(&h.db, "Ana", "America/New_York", Some("100")).await;

    sqlx::query(
        "CREATE TRIGGER reject_outgoing BEFORE INSERT ON user_messages \
         BEGIN SELECT RAISE(ABORT, 'log unavailable'); END",
    )
    .execute(h.db.pool())
    .await
    .unwrap();

    let report = h.coach.dispatcher().run(ScheduledRun::Morning).await.unwrap();
    assert_eq!(
        report,
        RunReport {
            candidates: 1,
            eligible: 1,
            sent: 1,
            unlogged: 1,
            ..Default::default()
        }
    );
    assert_eq!(h.sender.sent_to("100").len(), 1);
    assert!(message_log::list_messages(h.db.pool(), &u.id, 10).await.unwrap().is_empty());
}
