//! Integration tests for the studypulse telemetry feed
//!
//! These drive the engine deterministically (explicit timestamps, fixed RNG
//! seed) and verify the end-to-end contract a dashboard client relies on:
//! snapshot shape, tick progression, scripted scenario behavior, and the
//! subscription flow.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use studypulse_core::telemetry::{Engine, EVENT_UPDATE};
use studypulse_core::{AlertKind, FeedConfig, FocusLevel, ScheduledSession, Snapshot};

fn demo_config(seed: u64) -> FeedConfig {
    let mut config = FeedConfig::demo();
    config.seed = Some(seed);
    config
}

fn demo_engine(seed: u64) -> (Engine, DateTime<Utc>) {
    let now = Utc::now();
    let engine = Engine::new_at(demo_config(seed), now).expect("engine should build");
    (engine, now)
}

fn parse_duration_secs(formatted: &str) -> i64 {
    let (minutes, seconds) = formatted
        .split_once(':')
        .expect("duration should be m:ss");
    minutes.parse::<i64>().unwrap() * 60 + seconds.parse::<i64>().unwrap()
}

// ============================================
// Tick progression
// ============================================

#[test]
fn test_elapsed_strictly_increases_while_active() {
    let (mut engine, now) = demo_engine(100);

    let mut last: Option<Vec<i64>> = None;
    for step in 1..=10 {
        let at = now + Duration::seconds(step);
        engine.tick(at);
        let snapshot = engine.snapshot(at);

        let elapsed: Vec<i64> = snapshot
            .current_sessions
            .iter()
            .map(|s| parse_duration_secs(&s.duration))
            .collect();
        if let Some(previous) = &last {
            for (current, previous) in elapsed.iter().zip(previous) {
                assert!(
                    current > previous,
                    "elapsed should strictly increase: {current} <= {previous}"
                );
            }
        }
        last = Some(elapsed);
    }
}

#[test]
fn test_subscriber_sees_every_tick() {
    let (mut engine, now) = demo_engine(101);

    let seen: Arc<Mutex<Vec<Snapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.subscribe(
        EVENT_UPDATE,
        Box::new(move |snapshot| {
            sink.lock().unwrap().push(snapshot.clone());
        }),
    );

    for step in 1..=3 {
        engine.tick(now + Duration::seconds(step));
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|s| s.is_initialized));
    // Successive snapshots carry the advancing session clock.
    assert_eq!(seen[0].current_sessions[0].duration, "4:01");
    assert_eq!(seen[2].current_sessions[0].duration, "4:03");
}

// ============================================
// Scripted scenarios
// ============================================

#[test]
fn test_demo_children_report_scripted_progress() {
    let (mut engine, now) = demo_engine(102);

    // Hours of simulated ticking must not move the scripted figures.
    for step in 1..=20 {
        engine.tick(now + Duration::minutes(step * 10));
    }
    let late = now + Duration::minutes(200);

    let expected = [
        ("child1", 120, 600, 24, 450),
        ("child2", 90, 450, 72, 225),
        ("child3", 60, 300, 3, 30),
    ];
    for (child, daily_goal, weekly_goal, daily, weekly) in expected {
        engine.select_child(child, late);
        let snapshot = engine.snapshot(late);
        assert_eq!(snapshot.study_goals.daily, daily_goal, "{child}");
        assert_eq!(snapshot.study_goals.weekly, weekly_goal, "{child}");
        assert_eq!(snapshot.study_goals.current, daily, "{child}");
        assert_eq!(snapshot.study_goals.weekly_progress, weekly, "{child}");
    }
}

#[test]
fn test_scenario_focus_overrides_survive_ticks() {
    let (mut engine, now) = demo_engine(103);

    // Push Alex's session well past every focus-score threshold.
    let late = now + Duration::hours(2);
    engine.tick(late);
    let snapshot = engine.snapshot(late);

    let alex = &snapshot.current_sessions[0];
    let sarah = &snapshot.current_sessions[1];
    assert_eq!(alex.focus_level, FocusLevel::Medium);
    assert_eq!(sarah.focus_level, FocusLevel::High);
}

#[test]
fn test_recent_alert_buffer_never_exceeds_cap() {
    let (mut engine, now) = demo_engine(104);

    // Alex's scripted session started 4 minutes before `now`; land a tick on
    // every 45-minute mark for ten simulated hours.
    let start = now - Duration::minutes(4);
    for k in 1..=14 {
        engine.tick(start + Duration::seconds(2700 * k));
    }

    let late = start + Duration::seconds(2700 * 14);
    engine.select_child("child1", late);
    let snapshot = engine.snapshot(late);
    assert_eq!(snapshot.recent_alerts.len(), 10);
    assert!(snapshot
        .recent_alerts
        .iter()
        .all(|a| a.kind == AlertKind::Break));
}

// ============================================
// Operations
// ============================================

#[test]
fn test_start_session_respects_active_guard() {
    let mut config = demo_config(105);
    config.start_probability = 1.0;
    let now = Utc::now();
    let mut engine = Engine::new_at(config, now).unwrap();

    // Active children never double-start.
    assert!(!engine.start_session("child1", now));
    assert!(!engine.start_session("child2", now));

    // Idle child starts exactly once.
    assert!(engine.start_session("child3", now));
    assert!(!engine.start_session("child3", now));

    let snapshot = engine.snapshot(now);
    assert_eq!(snapshot.current_sessions.len(), 3);
    let fresh = snapshot
        .current_sessions
        .iter()
        .find(|s| s.child_id == "child3")
        .unwrap();
    assert_eq!(fresh.focus_level, FocusLevel::NotStarted);
    assert_eq!(fresh.distractions, 0);
    assert!(fresh.alerts.is_empty());
    assert!(fresh.notes.is_empty());
}

#[test]
fn test_schedule_and_note_round_trip() {
    let (mut engine, now) = demo_engine(106);

    let broadcasts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&broadcasts);
    engine.subscribe(
        EVENT_UPDATE,
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    // Scheduling assigns an id and broadcasts immediately.
    let id = engine.schedule_session(
        ScheduledSession {
            id: String::new(),
            child_id: "child3".to_string(),
            subject: "Science".to_string(),
            start_time: now + Duration::days(1),
            duration: 45,
            notes: Some("Chapter review".to_string()),
            is_recurring: false,
            recurring_days: None,
        },
        now,
    );
    assert!(!id.is_empty());
    assert_eq!(broadcasts.load(Ordering::SeqCst), 1);

    let snapshot = engine.snapshot(now);
    assert_eq!(
        snapshot
            .scheduled_sessions
            .iter()
            .filter(|s| s.id == id)
            .count(),
        1
    );

    // Notes resolve through the session id, not the child id.
    let session_id = snapshot.current_sessions[1].id.clone();
    assert!(engine.add_session_note(&session_id, "Flagged for review", now));
    assert_eq!(broadcasts.load(Ordering::SeqCst), 2);
    assert!(!engine.add_session_note("child2", "keyed wrong", now));
    assert_eq!(broadcasts.load(Ordering::SeqCst), 2);

    let snapshot = engine.snapshot(now);
    let sarah = &snapshot.current_sessions[1];
    assert_eq!(sarah.notes.len(), 1);
    assert_eq!(sarah.notes[0].content, "Flagged for review");
}

#[test]
fn test_goal_update_reflects_in_snapshot() {
    let (mut engine, now) = demo_engine(107);

    engine.select_child("child1", now);
    engine.update_study_goals("child1", 100, 500, now);
    let snapshot = engine.snapshot(now);
    assert_eq!(snapshot.study_goals.daily, 100);
    assert_eq!(snapshot.study_goals.weekly, 500);
}

// ============================================
// Seeding
// ============================================

#[test]
fn test_same_seed_reproduces_generated_state() {
    let now = Utc::now();
    let a = Engine::new_at(demo_config(108), now).unwrap();
    let b = Engine::new_at(demo_config(108), now).unwrap();

    let sa = a.snapshot(now);
    let sb = b.snapshot(now);

    for child in ["child1", "child2", "child3"] {
        let ha = &sa.session_history[child];
        let hb = &sb.session_history[child];
        assert_eq!(ha.len(), hb.len(), "history length for {child}");
        for (x, y) in ha.iter().zip(hb) {
            assert_eq!(x.start_time, y.start_time);
            assert_eq!(x.duration, y.duration);
            assert_eq!(x.distractions, y.distractions);
        }
    }

    assert_eq!(sa.scheduled_sessions.len(), sb.scheduled_sessions.len());
    for (x, y) in sa.scheduled_sessions.iter().zip(&sb.scheduled_sessions) {
        assert_eq!(x.subject, y.subject);
        assert_eq!(x.start_time, y.start_time);
        assert_eq!(x.duration, y.duration);
    }
}

#[test]
fn test_generic_seeding_for_unscripted_roster() {
    let mut config = demo_config(109);
    config.scenarios.clear();
    let now = Utc::now();
    let engine = Engine::new_at(config, now).unwrap();
    let snapshot = engine.snapshot(now);

    // Nobody is mid-session without the scripted openings.
    assert!(snapshot.current_sessions.is_empty());

    for child in ["child1", "child2", "child3"] {
        let history = &snapshot.session_history[child];
        assert!((3..=9).contains(&history.len()), "history for {child}");
    }
    // 2-4 scheduled sessions per child.
    let scheduled = snapshot.scheduled_sessions.len();
    assert!((6..=12).contains(&scheduled), "scheduled = {scheduled}");
}

// ============================================
// Wire shape
// ============================================

#[test]
fn test_snapshot_serializes_with_feed_field_names() {
    let (engine, now) = demo_engine(110);
    let value = serde_json::to_value(engine.snapshot(now)).unwrap();

    let object = value.as_object().unwrap();
    for key in [
        "currentSessions",
        "studyGoals",
        "recentAlerts",
        "sessionHistory",
        "isInitialized",
        "scheduledSessions",
    ] {
        assert!(object.contains_key(key), "missing key {key}");
    }

    assert!(value["studyGoals"]["weeklyProgress"].is_i64());

    let session = &value["currentSessions"][0];
    assert!(session["childId"].is_string());
    assert!(session["startTime"].is_string());
    assert_eq!(session["focusLevel"], "Medium");
    assert!(session.get("endTime").is_none());

    let alert = &session["alerts"][0];
    assert_eq!(alert["type"], "distraction");
    assert!(alert["time"].is_string());

    let scheduled = &value["scheduledSessions"][0];
    assert!(scheduled["isRecurring"].is_boolean());
}
