//! The session telemetry engine.
//!
//! Owns every piece of per-child state — live sessions, history, schedules,
//! alert buffers, goals — and the rules that advance it. The engine is fully
//! synchronous: every entry point takes an explicit timestamp, and all
//! randomness flows through one seedable RNG, so behavior is reproducible
//! under test. [`super::TelemetryFeed`] wraps it for shared use and drives
//! [`Engine::tick`] once per interval.
//!
//! Lookup misses are deliberately silent no-ops, matching the feed's
//! demo-service contract: there is no error taxonomy, no validation beyond
//! construction, and nothing to recover — state is ephemeral.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use super::bus::{EventBus, SnapshotCallback, SubscriberToken, EVENT_UPDATE};
use super::{focus_level, focus_score, seed, BREAK_ALERT_MESSAGE};
use crate::config::FeedConfig;
use crate::error::Result;
use crate::format::{format_clock_time, format_duration};
use crate::scenario::{ScenarioProfile, ScriptedAlert};
use crate::types::{
    Alert, AlertKind, CurrentSession, FocusLevel, GoalSummary, ScheduledSession, SessionNote,
    Snapshot, StudyGoals,
};

// Goal fallback when a snapshot targets a child with no stored goals.
const DEFAULT_DAILY_GOAL: i64 = 120;
const DEFAULT_WEEKLY_GOAL: i64 = 600;

pub struct Engine {
    config: FeedConfig,
    /// Scripted overlays by child id; consulted every tick and snapshot
    scenarios: HashMap<String, ScenarioProfile>,
    goals: HashMap<String, StudyGoals>,
    /// Active sessions keyed by child id — at most one per child
    current: HashMap<String, CurrentSession>,
    /// Session id → child id, so note lookups resolve by session id
    session_index: HashMap<String, String>,
    history: BTreeMap<String, Vec<CurrentSession>>,
    /// Live study-time counters in seconds, incremented once per tick
    live_seconds: HashMap<String, i64>,
    /// Newest-first alert ring buffers, capped at `recent_alert_cap`
    recent_alerts: HashMap<String, VecDeque<Alert>>,
    scheduled: Vec<ScheduledSession>,
    /// Snapshot focus target; falls back to the first active session
    selected_child: Option<String>,
    initialized: bool,
    rng: StdRng,
    bus: EventBus,
}

impl Engine {
    /// Build and seed an engine against the current wall clock.
    pub fn new(config: FeedConfig) -> Result<Self> {
        Self::new_at(config, Utc::now())
    }

    /// Build and seed an engine against an explicit timestamp.
    ///
    /// Tests use this together with [`Engine::tick`] to drive the simulation
    /// deterministically.
    pub fn new_at(config: FeedConfig, now: DateTime<Utc>) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scenarios = config
            .scenarios
            .iter()
            .map(|s| (s.child_id.clone(), s.clone()))
            .collect();

        let mut engine = Self {
            config,
            scenarios,
            goals: HashMap::new(),
            current: HashMap::new(),
            session_index: HashMap::new(),
            history: BTreeMap::new(),
            live_seconds: HashMap::new(),
            recent_alerts: HashMap::new(),
            scheduled: Vec::new(),
            selected_child: None,
            initialized: false,
            rng,
            bus: EventBus::new(),
        };
        engine.seed_at(now);
        Ok(engine)
    }

    /// Seed generic per-child state, then apply the scripted overlays.
    fn seed_at(&mut self, now: DateTime<Utc>) {
        let roster = self.config.roster.clone();
        for child in &roster {
            self.goals.insert(
                child.id.clone(),
                StudyGoals {
                    daily: child.daily_goal,
                    weekly: child.weekly_goal,
                },
            );
            self.live_seconds.insert(child.id.clone(), 0);
            self.recent_alerts.insert(child.id.clone(), VecDeque::new());

            let history = seed::seed_history(&mut self.rng, child, now);
            self.history.insert(child.id.clone(), history);
            let schedule = seed::seed_schedule(&mut self.rng, child, now);
            self.scheduled.extend(schedule);
        }

        let overlays: Vec<ScenarioProfile> = self.config.scenarios.clone();
        for scenario in &overlays {
            self.apply_scenario(scenario, now);
        }

        self.initialized = true;
        tracing::info!(
            children = roster.len(),
            scenarios = overlays.len(),
            scheduled = self.scheduled.len(),
            "telemetry engine seeded"
        );
    }

    /// Replace a child's generically seeded state with its scripted overlay.
    ///
    /// Generic scheduled sessions survive; the scripted ones are added on top
    /// (the demo calendar shows both).
    fn apply_scenario(&mut self, scenario: &ScenarioProfile, now: DateTime<Utc>) {
        let child_id = &scenario.child_id;

        let history = scenario
            .history
            .iter()
            .map(|past| {
                let start = now - Duration::hours(past.started_hours_ago);
                CurrentSession {
                    id: Uuid::new_v4().to_string(),
                    child_id: child_id.clone(),
                    start_time: start,
                    end_time: Some(start + Duration::minutes(past.duration_minutes)),
                    duration: format_duration(past.duration_minutes * 60),
                    focus_level: past.focus,
                    distractions: past.distractions,
                    alerts: scripted_alerts(&past.alerts, start),
                    subject: None,
                    notes: vec![],
                }
            })
            .collect();
        self.history.insert(child_id.clone(), history);

        if let Some(previous) = self.current.remove(child_id) {
            self.session_index.remove(&previous.id);
        }
        if let Some(opening) = &scenario.opening_session {
            let start = now - Duration::minutes(opening.started_minutes_ago);
            let session = CurrentSession {
                id: Uuid::new_v4().to_string(),
                child_id: child_id.clone(),
                start_time: start,
                end_time: None,
                duration: format_duration(opening.started_minutes_ago * 60),
                focus_level: opening.focus,
                distractions: opening.distractions,
                alerts: scripted_alerts(&opening.alerts, start),
                subject: None,
                notes: vec![],
            };
            self.session_index
                .insert(session.id.clone(), child_id.clone());
            self.current.insert(child_id.clone(), session);
        }

        // Recent alerts mirror the opening session, or the latest history
        // entry when the child is not mid-session.
        let seeded: Vec<Alert> = self
            .current
            .get(child_id)
            .map(|s| s.alerts.clone())
            .or_else(|| {
                self.history
                    .get(child_id)
                    .and_then(|h| h.last())
                    .map(|s| s.alerts.clone())
            })
            .unwrap_or_default();
        self.recent_alerts
            .insert(child_id.clone(), seeded.into_iter().collect());

        self.live_seconds
            .insert(child_id.clone(), scenario.live_seconds);

        for planned in &scenario.schedule {
            self.scheduled.push(ScheduledSession {
                id: Uuid::new_v4().to_string(),
                child_id: child_id.clone(),
                subject: planned.subject.clone(),
                start_time: now + Duration::hours(planned.starts_in_hours),
                duration: planned.duration_minutes,
                notes: planned.notes.clone(),
                is_recurring: planned.recurring_days.is_some(),
                recurring_days: planned.recurring_days.clone(),
            });
        }
    }

    // ========== Tick ==========

    /// Advance every active session to `now`, then broadcast a snapshot.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let active: Vec<String> = self.current.keys().cloned().collect();
        for child_id in &active {
            self.advance_session(child_id, now);
        }
        self.emit_update(now);
    }

    fn advance_session(&mut self, child_id: &str, now: DateTime<Utc>) {
        let scenario_focus = self.scenarios.get(child_id).and_then(|s| s.focus);
        let break_interval = self.config.break_interval_secs;
        let alert_cap = self.config.recent_alert_cap;

        let Some(session) = self.current.get_mut(child_id) else {
            return;
        };

        let elapsed = now.signed_duration_since(session.start_time).num_seconds();
        session.duration = format_duration(elapsed);
        *self
            .live_seconds
            .entry(child_id.to_string())
            .or_insert(0) += 1;

        session.focus_level = match scenario_focus {
            Some(focus) => focus,
            None => focus_level(focus_score(elapsed, session.distractions)),
        };

        if elapsed > 0 && elapsed % break_interval == 0 {
            let alert = Alert {
                id: now.timestamp_millis(),
                kind: AlertKind::Break,
                message: BREAK_ALERT_MESSAGE.to_string(),
                time: format_clock_time(now),
            };
            session.alerts.push(alert.clone());

            let buffer = self
                .recent_alerts
                .entry(child_id.to_string())
                .or_default();
            buffer.push_front(alert);
            buffer.truncate(alert_cap);
        }
    }

    // ========== Session lifecycle ==========

    /// Maybe start a session for the child.
    ///
    /// No-op while one is already active. Otherwise a session starts with the
    /// configured probability (the demo's simulated "child sat down" event).
    /// Returns whether a session started.
    pub fn start_session(&mut self, child_id: &str, now: DateTime<Utc>) -> bool {
        if self.current.contains_key(child_id) {
            return false;
        }
        if !self.rng.gen_bool(self.config.start_probability) {
            return false;
        }

        let session = CurrentSession {
            id: Uuid::new_v4().to_string(),
            child_id: child_id.to_string(),
            start_time: now,
            end_time: None,
            duration: format_duration(0),
            focus_level: FocusLevel::NotStarted,
            distractions: 0,
            alerts: vec![],
            subject: None,
            notes: vec![],
        };
        tracing::info!(child_id, session_id = %session.id, "study session started");
        self.session_index
            .insert(session.id.clone(), child_id.to_string());
        self.current.insert(child_id.to_string(), session);
        true
    }

    /// End the child's active session and append it to history.
    ///
    /// Returns whether a session was ended.
    pub fn end_session(&mut self, child_id: &str, now: DateTime<Utc>) -> bool {
        let Some(mut session) = self.current.remove(child_id) else {
            return false;
        };
        self.session_index.remove(&session.id);
        let elapsed = now.signed_duration_since(session.start_time).num_seconds();
        session.duration = format_duration(elapsed);
        session.end_time = Some(now);
        tracing::info!(child_id, session_id = %session.id, "study session ended");

        self.history
            .entry(child_id.to_string())
            .or_default()
            .push(session);
        self.emit_update(now);
        true
    }

    /// Store a scheduled session, assigning an id when absent.
    ///
    /// Returns the stored id. Re-scheduling an existing id replaces it.
    pub fn schedule_session(&mut self, mut session: ScheduledSession, now: DateTime<Utc>) -> String {
        if session.id.is_empty() {
            session.id = Uuid::new_v4().to_string();
        }
        let id = session.id.clone();
        tracing::info!(
            session_id = %id,
            child_id = %session.child_id,
            subject = %session.subject,
            "session scheduled"
        );

        match self.scheduled.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = session,
            None => self.scheduled.push(session),
        }
        self.emit_update(now);
        id
    }

    /// Attach a note to an active session, resolved by session id.
    ///
    /// Silently ignores unknown or no-longer-active sessions. Returns whether
    /// the note was attached.
    pub fn add_session_note(&mut self, session_id: &str, content: &str, now: DateTime<Utc>) -> bool {
        let Some(child_id) = self.session_index.get(session_id).cloned() else {
            tracing::debug!(session_id, "note dropped: no active session with that id");
            return false;
        };
        let Some(session) = self.current.get_mut(&child_id) else {
            return false;
        };
        session.notes.push(SessionNote {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            content: content.to_string(),
            timestamp: now,
        });
        self.emit_update(now);
        true
    }

    /// Overwrite a child's study goals.
    pub fn update_study_goals(&mut self, child_id: &str, daily: i64, weekly: i64, now: DateTime<Utc>) {
        self.goals
            .insert(child_id.to_string(), StudyGoals { daily, weekly });
        self.emit_update(now);
    }

    /// Empty the child's recent-alerts buffer.
    pub fn clear_alerts(&mut self, child_id: &str) {
        if let Some(buffer) = self.recent_alerts.get_mut(child_id) {
            buffer.clear();
        }
    }

    /// Point the snapshot's per-child fields at this child.
    pub fn select_child(&mut self, child_id: &str, now: DateTime<Utc>) {
        self.selected_child = Some(child_id.to_string());
        self.emit_update(now);
    }

    // ========== Subscription ==========

    pub fn subscribe(&mut self, event: &str, callback: SnapshotCallback) -> SubscriberToken {
        self.bus.subscribe(event, callback)
    }

    pub fn unsubscribe(&mut self, token: &SubscriberToken) -> bool {
        self.bus.unsubscribe(token)
    }

    fn emit_update(&mut self, now: DateTime<Utc>) {
        let snapshot = self.snapshot(now);
        self.bus.emit(EVENT_UPDATE, &snapshot);
    }

    // ========== Snapshot assembly ==========

    /// The child whose goals and alerts the snapshot reports: the selected
    /// child when set, otherwise the first roster child with an active
    /// session.
    fn target_child(&self) -> Option<&str> {
        if let Some(id) = &self.selected_child {
            return Some(id.as_str());
        }
        self.config
            .roster
            .iter()
            .find(|c| self.current.contains_key(&c.id))
            .map(|c| c.id.as_str())
            .or_else(|| self.current.keys().next().map(String::as_str))
    }

    /// Historical study minutes inside the today / last-7-days windows, plus
    /// the live counter. Windows are computed against UTC midnight.
    fn study_minutes(&self, child_id: &str, now: DateTime<Utc>) -> (i64, i64) {
        let week_ago = now - Duration::days(7);
        let today_start = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();

        let mut daily = 0;
        let mut weekly = 0;
        if let Some(sessions) = self.history.get(child_id) {
            for session in sessions {
                if session.start_time >= week_ago {
                    let minutes = session.duration_minutes();
                    weekly += minutes;
                    if session.start_time >= today_start {
                        daily += minutes;
                    }
                }
            }
        }

        let live_minutes = self.live_seconds.get(child_id).copied().unwrap_or(0) / 60;
        (daily + live_minutes, weekly + live_minutes)
    }

    /// Assemble the consolidated snapshot broadcast to subscribers.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        let target = self.target_child();

        let goals = target
            .and_then(|id| self.goals.get(id))
            .copied()
            .unwrap_or(StudyGoals {
                daily: DEFAULT_DAILY_GOAL,
                weekly: DEFAULT_WEEKLY_GOAL,
            });

        let (computed_daily, computed_weekly) = match target {
            Some(id) => self.study_minutes(id, now),
            None => (0, 0),
        };

        // Scenario children report their scripted progress fractions instead
        // of the computed aggregates, regardless of elapsed real time.
        let scenario = target.and_then(|id| self.scenarios.get(id));
        let daily = scenario
            .and_then(|s| s.daily_progress)
            .map(|f| (goals.daily as f64 * f).floor() as i64)
            .unwrap_or(computed_daily);
        let weekly = scenario
            .and_then(|s| s.weekly_progress)
            .map(|f| (goals.weekly as f64 * f).floor() as i64)
            .unwrap_or(computed_weekly);
        let scripted = scenario
            .map(|s| s.daily_progress.is_some() || s.weekly_progress.is_some())
            .unwrap_or(false);

        let recent_alerts = target
            .and_then(|id| self.recent_alerts.get(id))
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default();

        // Roster order first, then any sessions started for off-roster ids.
        let mut current_sessions: Vec<CurrentSession> = self
            .config
            .roster
            .iter()
            .filter_map(|c| self.current.get(&c.id))
            .cloned()
            .collect();
        for (child_id, session) in &self.current {
            if !self.config.roster.iter().any(|c| &c.id == child_id) {
                current_sessions.push(session.clone());
            }
        }

        Snapshot {
            current_sessions,
            study_goals: GoalSummary {
                daily: goals.daily,
                weekly: goals.weekly,
                current: if scripted { daily } else { weekly },
                weekly_progress: weekly,
            },
            recent_alerts,
            session_history: self.history.clone(),
            is_initialized: self.initialized,
            scheduled_sessions: self.scheduled.clone(),
        }
    }
}

fn scripted_alerts(alerts: &[ScriptedAlert], session_start: DateTime<Utc>) -> Vec<Alert> {
    alerts
        .iter()
        .map(|alert| {
            let at = session_start + Duration::minutes(alert.offset_minutes);
            Alert {
                id: at.timestamp_millis(),
                kind: alert.kind,
                message: alert.message.clone(),
                time: format_clock_time(at),
            }
        })
        .collect()
}
