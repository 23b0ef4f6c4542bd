//! Generic mock-data seeding.
//!
//! Fabricates a plausible week of history and a few upcoming sessions per
//! child. Scripted scenario overlays replace this output for the demo
//! children; everyone else keeps it.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

use super::{focus_level, focus_score, BREAK_ALERT_MESSAGE};
use crate::format::{format_clock_time, format_duration};
use crate::types::{Alert, AlertKind, ChildProfile, CurrentSession, ScheduledSession};

pub(crate) const SUBJECTS: [&str; 5] =
    ["Mathematics", "Science", "English", "History", "Geography"];

/// Place a timestamp on a study-plausible hour (08:00–19:xx).
fn at_study_hour(ts: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    ts.with_hour(hour).unwrap_or(ts)
}

/// Generate 3–9 completed sessions from the last 7 days.
pub(crate) fn seed_history(
    rng: &mut StdRng,
    child: &ChildProfile,
    now: DateTime<Utc>,
) -> Vec<CurrentSession> {
    let count = rng.gen_range(3..=9);
    let mut sessions = Vec::with_capacity(count);

    for _ in 0..count {
        let days_back = rng.gen_range(0..7);
        let hour = rng.gen_range(8..20);
        let start = at_study_hour(now - Duration::days(days_back), hour);

        // 30 to 150 minutes of study
        let duration_secs = rng.gen_range(1800..9000);
        let distractions = rng.gen_range(0..5);

        sessions.push(CurrentSession {
            id: Uuid::new_v4().to_string(),
            child_id: child.id.clone(),
            start_time: start,
            end_time: Some(start + Duration::seconds(duration_secs)),
            duration: format_duration(duration_secs),
            focus_level: focus_level(focus_score(duration_secs, distractions)),
            distractions,
            alerts: session_alerts(rng, start, duration_secs, distractions),
            subject: None,
            notes: vec![],
        });
    }

    sessions
}

/// Break reminders every 45 minutes of the session, plus one distraction
/// alert per recorded distraction at a random offset.
pub(crate) fn session_alerts(
    rng: &mut StdRng,
    start: DateTime<Utc>,
    duration_secs: i64,
    distractions: u32,
) -> Vec<Alert> {
    let end = start + Duration::seconds(duration_secs);
    let mut alerts = Vec::new();

    let mut at = start + Duration::minutes(45);
    while at < end {
        alerts.push(Alert {
            id: at.timestamp_millis(),
            kind: AlertKind::Break,
            message: BREAK_ALERT_MESSAGE.to_string(),
            time: format_clock_time(at),
        });
        at += Duration::minutes(45);
    }

    for _ in 0..distractions {
        let at = start + Duration::seconds(rng.gen_range(0..duration_secs.max(1)));
        alerts.push(Alert {
            id: at.timestamp_millis(),
            kind: AlertKind::Distraction,
            message: "Phone detected during study time".to_string(),
            time: format_clock_time(at),
        });
    }

    alerts
}

/// Generate 2–4 upcoming scheduled sessions within the next week.
pub(crate) fn seed_schedule(
    rng: &mut StdRng,
    child: &ChildProfile,
    now: DateTime<Utc>,
) -> Vec<ScheduledSession> {
    let count = rng.gen_range(2..=4);
    let mut sessions = Vec::with_capacity(count);

    for _ in 0..count {
        let days_ahead = rng.gen_range(1..8);
        let hour = rng.gen_range(8..20);
        let start = at_study_hour(now + Duration::days(days_ahead), hour);
        let subject = SUBJECTS[rng.gen_range(0..SUBJECTS.len())];
        let is_recurring = rng.gen_bool(0.3);

        sessions.push(ScheduledSession {
            id: Uuid::new_v4().to_string(),
            child_id: child.id.clone(),
            subject: subject.to_string(),
            start_time: start,
            duration: rng.gen_range(30..150),
            notes: Some(format!("Scheduled {} study session", subject)),
            is_recurring,
            recurring_days: is_recurring.then(|| vec![1, 3, 5]),
        });
    }

    sessions
}
