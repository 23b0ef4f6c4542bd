//! # studypulse-core
//!
//! Core library for studypulse - a parent-facing study-monitoring dashboard.
//!
//! This library provides:
//! - Domain types for sessions, alerts, schedules, and goal progress
//! - The session telemetry feed: a seeded simulator that advances per-child
//!   state once per tick and broadcasts consolidated snapshots
//! - Scripted demo scenarios, expressed as data
//! - Configuration management and logging infrastructure
//! - Canned campus-service integrations (parking, volunteering)
//!
//! ## Example
//!
//! ```rust,no_run
//! use studypulse_core::{FeedConfig, TelemetryFeed, EVENT_UPDATE};
//!
//! # async fn run() -> studypulse_core::Result<()> {
//! let feed = TelemetryFeed::new(FeedConfig::demo())?;
//! feed.subscribe(EVENT_UPDATE, |snapshot| {
//!     println!("{} active sessions", snapshot.current_sessions.len());
//! });
//! feed.start()?;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, FeedConfig};
pub use error::{Error, Result};
pub use scenario::{demo_scenarios, ScenarioProfile};
pub use telemetry::{focus_level, focus_score, Engine, TelemetryFeed, EVENT_UPDATE};
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod format;
pub mod integrations;
pub mod logging;
pub mod scenario;
pub mod telemetry;
pub mod types;
