//! Shared feed handle and the periodic tick driver.
//!
//! [`TelemetryFeed`] wraps the [`Engine`] behind a mutex so a consumer can
//! hold one handle, subscribe, and call the mutating operations while the
//! driver task ticks in the background. All state mutation happens inside the
//! lock, one call at a time; subscriber callbacks run synchronously within
//! the emitting call.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::bus::SubscriberToken;
use super::engine::Engine;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::types::{ScheduledSession, Snapshot};

pub struct TelemetryFeed {
    engine: Arc<Mutex<Engine>>,
    tick_interval: Duration,
    driver: Mutex<Option<Driver>>,
}

struct Driver {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TelemetryFeed {
    /// Build a feed from configuration. Seeding happens here; the periodic
    /// tick does not run until [`TelemetryFeed::start`].
    pub fn new(config: FeedConfig) -> Result<Self> {
        let tick_interval = Duration::from_millis(config.tick_interval_ms);
        let engine = Engine::new(config)?;
        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            tick_interval,
            driver: Mutex::new(None),
        })
    }

    fn state(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().expect("telemetry engine lock poisoned")
    }

    /// Spawn the periodic tick driver.
    ///
    /// Must be called from within a tokio runtime. Errors with
    /// [`Error::AlreadyRunning`] if the driver is already up.
    pub fn start(&self) -> Result<()> {
        let mut driver = self.driver.lock().expect("feed driver lock poisoned");
        if driver.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let engine = Arc::clone(&self.engine);
        let interval = self.tick_interval;
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let first = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(first, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        engine
                            .lock()
                            .expect("telemetry engine lock poisoned")
                            .tick(Utc::now());
                    }
                    _ = stopped.changed() => break,
                }
            }
        });

        *driver = Some(Driver { shutdown, task });
        tracing::info!(interval_ms = interval.as_millis() as u64, "telemetry feed started");
        Ok(())
    }

    /// Stop the tick driver. Idempotent; subscriber registrations survive.
    pub fn stop(&self) {
        let taken = self
            .driver
            .lock()
            .expect("feed driver lock poisoned")
            .take();
        if let Some(driver) = taken {
            let _ = driver.shutdown.send(true);
            driver.task.abort();
            tracing::info!("telemetry feed stopped");
        }
    }

    /// Whether the tick driver is currently running.
    pub fn is_running(&self) -> bool {
        self.driver
            .lock()
            .expect("feed driver lock poisoned")
            .is_some()
    }

    // ========== Engine pass-throughs ==========

    /// Register a snapshot callback under an event name
    /// (see [`super::EVENT_UPDATE`]).
    pub fn subscribe<F>(&self, event: &str, callback: F) -> SubscriberToken
    where
        F: Fn(&Snapshot) + Send + 'static,
    {
        self.state().subscribe(event, Box::new(callback))
    }

    pub fn unsubscribe(&self, token: &SubscriberToken) -> bool {
        self.state().unsubscribe(token)
    }

    /// Assemble a snapshot on demand, outside the tick cadence.
    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot(Utc::now())
    }

    pub fn start_session(&self, child_id: &str) -> bool {
        self.state().start_session(child_id, Utc::now())
    }

    pub fn end_session(&self, child_id: &str) -> bool {
        self.state().end_session(child_id, Utc::now())
    }

    pub fn schedule_session(&self, session: ScheduledSession) -> String {
        self.state().schedule_session(session, Utc::now())
    }

    pub fn add_session_note(&self, session_id: &str, content: &str) -> bool {
        self.state().add_session_note(session_id, content, Utc::now())
    }

    pub fn update_study_goals(&self, child_id: &str, daily: i64, weekly: i64) {
        self.state().update_study_goals(child_id, daily, weekly, Utc::now())
    }

    pub fn clear_alerts(&self, child_id: &str) {
        self.state().clear_alerts(child_id)
    }

    pub fn select_child(&self, child_id: &str) {
        self.state().select_child(child_id, Utc::now())
    }
}

impl Drop for TelemetryFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::EVENT_UPDATE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick_config(seed: u64) -> FeedConfig {
        let mut config = FeedConfig::demo();
        config.seed = Some(seed);
        config.tick_interval_ms = 10;
        config
    }

    #[test]
    fn test_operations_work_without_driver() {
        let mut config = quick_config(20);
        config.start_probability = 1.0;
        let feed = TelemetryFeed::new(config).unwrap();

        assert!(!feed.is_running());
        assert!(feed.start_session("child3"));
        let snapshot = feed.snapshot();
        assert!(snapshot
            .current_sessions
            .iter()
            .any(|s| s.child_id == "child3"));
        assert!(feed.end_session("child3"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_driver_ticks_subscribers() {
        let feed = TelemetryFeed::new(quick_config(21)).unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        feed.subscribe(EVENT_UPDATE, move |snapshot| {
            assert!(snapshot.is_initialized);
            c.fetch_add(1, Ordering::SeqCst);
        });

        feed.start().unwrap();
        assert!(feed.is_running());
        assert!(matches!(feed.start(), Err(Error::AlreadyRunning)));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(count.load(Ordering::SeqCst) >= 2, "driver never ticked");
        feed.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_is_idempotent_and_halts_ticks() {
        let feed = TelemetryFeed::new(quick_config(22)).unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        feed.subscribe(EVENT_UPDATE, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        feed.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        feed.stop();
        feed.stop();
        assert!(!feed.is_running());

        // Let any in-flight tick land, then confirm the stream is quiet.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), settled);

        // A stopped feed can start again.
        feed.start().unwrap();
        feed.stop();
    }
}
