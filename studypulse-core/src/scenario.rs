//! Scripted demo scenarios.
//!
//! The product demo ships three hand-authored child profiles (a mid-session
//! student, a high performer, and a struggling one). Rather than branching on
//! child ids inside the simulation, each scripted state is expressed as a
//! [`ScenarioProfile`] value injected through the feed configuration; the
//! engine applies whatever profiles it is given and stays branch-free.
//!
//! A profile fully replaces the generic seeded state for its child: the
//! scripted opening session, history, and schedule are installed verbatim, and
//! the standing overrides (`focus`, `daily_progress`, `weekly_progress`) keep
//! steering the per-tick focus label and the snapshot progress figures for the
//! lifetime of the feed.

use serde::{Deserialize, Serialize};

use crate::types::{AlertKind, ChildProfile, FocusLevel, StudyGoals};

/// A scripted per-child state, applied on top of generic seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProfile {
    /// Child this profile applies to; must exist in the roster
    pub child_id: String,
    /// Focus level forced on every tick, overriding the computed score
    #[serde(default)]
    pub focus: Option<FocusLevel>,
    /// Fixed daily progress as a fraction of the daily goal (e.g. `0.2`)
    #[serde(default)]
    pub daily_progress: Option<f64>,
    /// Fixed weekly progress as a fraction of the weekly goal
    #[serde(default)]
    pub weekly_progress: Option<f64>,
    /// Seed value for the child's live study-time counter, in seconds
    #[serde(default)]
    pub live_seconds: i64,
    /// Session already in progress when the feed comes up
    #[serde(default)]
    pub opening_session: Option<ScriptedSession>,
    /// Replacement session history
    #[serde(default)]
    pub history: Vec<ScriptedPastSession>,
    /// Scheduled sessions added on top of the generically seeded ones
    #[serde(default)]
    pub schedule: Vec<ScriptedScheduledSession>,
}

/// An in-progress session scripted relative to feed startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedSession {
    pub started_minutes_ago: i64,
    pub focus: FocusLevel,
    pub distractions: u32,
    #[serde(default)]
    pub alerts: Vec<ScriptedAlert>,
}

/// An alert scripted relative to its owning session's start time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedAlert {
    pub kind: AlertKind,
    pub message: String,
    /// Minutes after the owning session started
    pub offset_minutes: i64,
}

/// A completed session scripted relative to feed startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedPastSession {
    pub started_hours_ago: i64,
    pub duration_minutes: i64,
    pub focus: FocusLevel,
    pub distractions: u32,
    #[serde(default)]
    pub alerts: Vec<ScriptedAlert>,
}

/// A planned session scripted relative to feed startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedScheduledSession {
    pub subject: String,
    pub starts_in_hours: i64,
    pub duration_minutes: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Weekdays (0 = Sunday .. 6 = Saturday); presence makes it recurring
    #[serde(default)]
    pub recurring_days: Option<Vec<u8>>,
}

fn goals_for(roster: &[ChildProfile], child_id: &str, fallback: StudyGoals) -> StudyGoals {
    roster
        .iter()
        .find(|c| c.id == child_id)
        .map(|c| StudyGoals {
            daily: c.daily_goal,
            weekly: c.weekly_goal,
        })
        .unwrap_or(fallback)
}

fn distraction(message: &str, offset_minutes: i64) -> ScriptedAlert {
    ScriptedAlert {
        kind: AlertKind::Distraction,
        message: message.to_string(),
        offset_minutes,
    }
}

fn break_reminder(offset_minutes: i64) -> ScriptedAlert {
    ScriptedAlert {
        kind: AlertKind::Break,
        message: "Time for a 5-minute break".to_string(),
        offset_minutes,
    }
}

/// Build the three demo profiles against the given roster's goals.
///
/// The scripted progress figures scale with the roster goals so the profiles
/// stay coherent if a config overrides the demo goal minutes.
pub fn demo_scenarios(roster: &[ChildProfile]) -> Vec<ScenarioProfile> {
    vec![
        alex_profile(roster),
        sarah_profile(roster),
        michael_profile(roster),
    ]
}

/// Alex: 4 minutes into a session, 20% daily / 75% weekly, medium focus.
fn alex_profile(roster: &[ChildProfile]) -> ScenarioProfile {
    let goals = goals_for(
        roster,
        "child1",
        StudyGoals {
            daily: 120,
            weekly: 600,
        },
    );
    let daily_minutes = (goals.daily as f64 * 0.2).floor() as i64;
    let weekly_minutes = (goals.weekly as f64 * 0.75).floor() as i64;

    // Spread the weekly remainder across four past days.
    let mut history = Vec::new();
    let mut remaining = weekly_minutes - daily_minutes;
    let days_ago = [1_i64, 2, 3, 5];
    for (i, days) in days_ago.iter().enumerate() {
        let minutes = remaining / (days_ago.len() - i) as i64;
        remaining -= minutes;
        if minutes > 0 {
            history.push(ScriptedPastSession {
                started_hours_ago: days * 24,
                duration_minutes: minutes,
                focus: FocusLevel::Medium,
                distractions: 2,
                alerts: vec![
                    break_reminder(45),
                    distraction("Phone detected during study time", 20),
                ],
            });
        }
    }

    ScenarioProfile {
        child_id: "child1".to_string(),
        focus: Some(FocusLevel::Medium),
        daily_progress: Some(0.2),
        weekly_progress: Some(0.75),
        live_seconds: 4 * 60,
        opening_session: Some(ScriptedSession {
            started_minutes_ago: 4,
            focus: FocusLevel::Medium,
            distractions: 2,
            alerts: vec![
                distraction("Phone detected during study time", 2),
                distraction("Social media notification detected", 1),
            ],
        }),
        history,
        schedule: vec![
            ScriptedScheduledSession {
                subject: "Mathematics".to_string(),
                starts_in_hours: 24,
                duration_minutes: 60,
                notes: Some("Algebra homework session".to_string()),
                recurring_days: Some(vec![1, 3, 5]),
            },
            ScriptedScheduledSession {
                subject: "Science".to_string(),
                starts_in_hours: 48,
                duration_minutes: 45,
                notes: Some("Physics lab preparation".to_string()),
                recurring_days: None,
            },
        ],
    }
}

/// Sarah: 12 minutes into a session, 80% daily / 50% weekly, high focus.
fn sarah_profile(roster: &[ChildProfile]) -> ScenarioProfile {
    let goals = goals_for(
        roster,
        "child2",
        StudyGoals {
            daily: 90,
            weekly: 450,
        },
    );
    let daily_minutes = (goals.daily as f64 * 0.8).floor() as i64;
    let weekly_fill = (goals.weekly as f64 * 0.5).floor() as i64 - daily_minutes;

    let mut history = vec![ScriptedPastSession {
        started_hours_ago: 4,
        duration_minutes: daily_minutes - 12,
        focus: FocusLevel::High,
        distractions: 0,
        alerts: vec![break_reminder(60)],
    }];
    if weekly_fill > 0 {
        history.push(ScriptedPastSession {
            started_hours_ago: 72,
            duration_minutes: weekly_fill,
            focus: FocusLevel::High,
            distractions: 1,
            alerts: vec![
                break_reminder(45),
                distraction("Brief distraction detected", 75),
            ],
        });
    }

    ScenarioProfile {
        child_id: "child2".to_string(),
        focus: Some(FocusLevel::High),
        daily_progress: Some(0.8),
        weekly_progress: Some(0.5),
        live_seconds: 12 * 60,
        opening_session: Some(ScriptedSession {
            started_minutes_ago: 12,
            focus: FocusLevel::High,
            distractions: 0,
            alerts: vec![break_reminder(12)],
        }),
        history,
        schedule: vec![
            ScriptedScheduledSession {
                subject: "English".to_string(),
                starts_in_hours: 72,
                duration_minutes: 90,
                notes: Some("Essay writing session".to_string()),
                recurring_days: None,
            },
            ScriptedScheduledSession {
                subject: "History".to_string(),
                starts_in_hours: 36,
                duration_minutes: 60,
                notes: Some("Prepare for history test".to_string()),
                recurring_days: Some(vec![2, 4]),
            },
        ],
    }
}

/// Michael: no active session, 5% daily / 10% weekly, low focus.
fn michael_profile(roster: &[ChildProfile]) -> ScenarioProfile {
    let goals = goals_for(
        roster,
        "child3",
        StudyGoals {
            daily: 60,
            weekly: 300,
        },
    );
    let daily_minutes = (goals.daily as f64 * 0.05).floor() as i64;
    let weekly_minutes = (goals.weekly as f64 * 0.1).floor() as i64;

    ScenarioProfile {
        child_id: "child3".to_string(),
        focus: Some(FocusLevel::Low),
        daily_progress: Some(0.05),
        weekly_progress: Some(0.1),
        live_seconds: daily_minutes * 60,
        opening_session: None,
        history: vec![
            ScriptedPastSession {
                started_hours_ago: 2,
                duration_minutes: daily_minutes,
                focus: FocusLevel::Low,
                distractions: 4,
                alerts: vec![
                    distraction("Playing games during study time", 1),
                    distraction("Text message interruption", 2),
                    distraction("Social media browsing detected", 2),
                    distraction("YouTube video watching detected", 3),
                ],
            },
            ScriptedPastSession {
                started_hours_ago: 5 * 24,
                duration_minutes: weekly_minutes,
                focus: FocusLevel::Low,
                distractions: 3,
                alerts: vec![distraction("Multiple distractions detected", 15)],
            },
        ],
        schedule: vec![ScriptedScheduledSession {
            subject: "Mathematics".to_string(),
            starts_in_hours: 12,
            duration_minutes: 30,
            notes: Some("Math tutoring session".to_string()),
            recurring_days: None,
        }],
    }
}
