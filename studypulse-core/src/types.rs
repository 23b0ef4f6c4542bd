//! Core domain types for studypulse
//!
//! These types model the telemetry feed a parent dashboard consumes: live and
//! historical study sessions, scheduled sessions, alerts, and goal progress.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Child** | A monitored student; identified by a stable child id |
//! | **Session** | A period of study activity; at most one active per child |
//! | **Alert** | A distraction or break event raised during a session |
//! | **Scheduled session** | A planned future session, optionally recurring |
//! | **Snapshot** | The consolidated feed payload broadcast every tick |
//!
//! Snapshot-facing types serialize with camelCase field names because the
//! snapshot is the wire shape of the simulated feed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Children and goals
// ============================================

/// Per-child settings as supplied by the parent's profile.
///
/// The roster is injected into the feed at construction; the feed never
/// mutates it (goals have their own mutable store, seeded from here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildProfile {
    /// Stable child identifier (e.g. `child1`)
    pub id: String,
    /// Display name
    pub name: String,
    /// School grade label (e.g. `7th Grade`)
    pub grade: String,
    /// Daily study goal in minutes
    pub daily_goal: i64,
    /// Weekly study goal in minutes
    pub weekly_goal: i64,
    /// Whether break reminders are enabled
    #[serde(default = "default_true")]
    pub break_reminders: bool,
    /// Whether distraction alerts are enabled
    #[serde(default = "default_true")]
    pub distraction_alerts: bool,
    /// Whether weekly email reports are enabled
    #[serde(default)]
    pub email_reports: bool,
}

fn default_true() -> bool {
    true
}

/// Study-goal minutes for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyGoals {
    /// Daily goal in minutes
    pub daily: i64,
    /// Weekly goal in minutes
    pub weekly: i64,
}

// ============================================
// Sessions
// ============================================

/// Focus level reported for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusLevel {
    High,
    Medium,
    Low,
    #[serde(rename = "Not Started")]
    NotStarted,
}

impl FocusLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusLevel::High => "High",
            FocusLevel::Medium => "Medium",
            FocusLevel::Low => "Low",
            FocusLevel::NotStarted => "Not Started",
        }
    }
}

impl std::fmt::Display for FocusLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of alert raised during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Distraction,
    Break,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Distraction => "distraction",
            AlertKind::Break => "break",
        }
    }
}

/// A distraction or break event.
///
/// The id is derived from the wall-clock millisecond timestamp of the event.
/// It is monotonic-ish but NOT guaranteed unique under rapid generation; no
/// consumer may treat it as a primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    /// Pre-formatted local clock time (see [`crate::format::format_clock_time`])
    pub time: String,
}

/// A free-form note attached to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNote {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A study session, live or historical.
///
/// While active, `end_time` is `None` and the feed rewrites `duration` and
/// `focus_level` every tick. Ending a session stamps `end_time` and moves the
/// value into the child's history, after which it is never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSession {
    pub id: String,
    pub child_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed time formatted as `m:ss`
    pub duration: String,
    pub focus_level: FocusLevel,
    pub distractions: u32,
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub notes: Vec<SessionNote>,
}

impl CurrentSession {
    /// Whether the session is still running.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whole minutes the session covered, 0 while still running.
    pub fn duration_minutes(&self) -> i64 {
        match self.end_time {
            Some(end) => end.signed_duration_since(self.start_time).num_minutes(),
            None => 0,
        }
    }
}

/// A planned future session.
///
/// Scheduled sessions are append-only: never mutated and never auto-removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub id: String,
    pub child_id: String,
    pub subject: String,
    pub start_time: DateTime<Utc>,
    /// Planned length in minutes
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_recurring: bool,
    /// Weekdays the session repeats on (0 = Sunday .. 6 = Saturday)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_days: Option<Vec<u8>>,
}

// ============================================
// Snapshot
// ============================================

/// Goal progress block inside a snapshot, scoped to the target child.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    /// Daily goal in minutes
    pub daily: i64,
    /// Weekly goal in minutes
    pub weekly: i64,
    /// Progress minutes shown by the dashboard gauge: daily minutes for
    /// scenario-scripted children, weekly minutes otherwise
    pub current: i64,
    /// Weekly study minutes, always present
    pub weekly_progress: i64,
}

/// The consolidated payload broadcast to every subscriber on each tick and
/// after each mutating call.
///
/// `study_goals` and `recent_alerts` are scoped to the snapshot's target
/// child; everything else covers the whole roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_sessions: Vec<CurrentSession>,
    pub study_goals: GoalSummary,
    pub recent_alerts: Vec<Alert>,
    pub session_history: BTreeMap<String, Vec<CurrentSession>>,
    pub is_initialized: bool,
    pub scheduled_sessions: Vec<ScheduledSession>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_level_labels() {
        assert_eq!(FocusLevel::High.as_str(), "High");
        assert_eq!(FocusLevel::NotStarted.as_str(), "Not Started");
        assert_eq!(
            serde_json::to_string(&FocusLevel::NotStarted).unwrap(),
            "\"Not Started\""
        );
    }

    #[test]
    fn test_alert_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&AlertKind::Distraction).unwrap(),
            "\"distraction\""
        );
        assert_eq!(serde_json::to_string(&AlertKind::Break).unwrap(), "\"break\"");
    }

    #[test]
    fn test_session_duration_minutes() {
        let start = Utc::now();
        let mut session = CurrentSession {
            id: "s1".to_string(),
            child_id: "child1".to_string(),
            start_time: start,
            end_time: None,
            duration: "0:00".to_string(),
            focus_level: FocusLevel::NotStarted,
            distractions: 0,
            alerts: vec![],
            subject: None,
            notes: vec![],
        };
        assert!(session.is_active());
        assert_eq!(session.duration_minutes(), 0);

        session.end_time = Some(start + chrono::Duration::seconds(150));
        assert!(!session.is_active());
        assert_eq!(session.duration_minutes(), 2);
    }
}
