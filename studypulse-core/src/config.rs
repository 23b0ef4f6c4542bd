//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/studypulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/studypulse/` (~/.config/studypulse/)
//! - State/Logs: `$XDG_STATE_HOME/studypulse/` (~/.local/state/studypulse/)
//!
//! With no config file present everything falls back to the demo setup: the
//! three-child demo roster plus the scripted scenarios that drive the product
//! demo. A config that declares its own roster should also declare (or empty
//! out) `scenarios`; profiles referencing unknown children are rejected when
//! the feed is constructed.

use crate::error::{Error, Result};
use crate::scenario::{demo_scenarios, ScenarioProfile};
use crate::types::ChildProfile;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Telemetry feed configuration
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Milliseconds between ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Probability that `start_session` actually starts one
    #[serde(default = "default_start_probability")]
    pub start_probability: f64,

    /// Seconds of elapsed session time between break reminders
    #[serde(default = "default_break_interval_secs")]
    pub break_interval_secs: i64,

    /// Maximum entries kept in each child's recent-alerts buffer
    #[serde(default = "default_recent_alert_cap")]
    pub recent_alert_cap: usize,

    /// RNG seed for mock data generation; random when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Monitored children and their goal defaults
    #[serde(default = "FeedConfig::demo_roster")]
    pub roster: Vec<ChildProfile>,

    /// Scripted per-child overlays applied after generic seeding
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioProfile>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            start_probability: default_start_probability(),
            break_interval_secs: default_break_interval_secs(),
            recent_alert_cap: default_recent_alert_cap(),
            seed: None,
            roster: Self::demo_roster(),
            scenarios: default_scenarios(),
        }
    }
}

impl FeedConfig {
    /// The demo parent's three children, goals as the profile stub supplies
    /// them.
    pub fn demo_roster() -> Vec<ChildProfile> {
        vec![
            ChildProfile {
                id: "child1".to_string(),
                name: "Alex Thompson".to_string(),
                grade: "11th Grade".to_string(),
                daily_goal: 120,
                weekly_goal: 600,
                break_reminders: true,
                distraction_alerts: true,
                email_reports: true,
            },
            ChildProfile {
                id: "child2".to_string(),
                name: "Sarah Thompson".to_string(),
                grade: "9th Grade".to_string(),
                daily_goal: 90,
                weekly_goal: 450,
                break_reminders: true,
                distraction_alerts: true,
                email_reports: false,
            },
            ChildProfile {
                id: "child3".to_string(),
                name: "Michael Thompson".to_string(),
                grade: "7th Grade".to_string(),
                daily_goal: 60,
                weekly_goal: 300,
                break_reminders: true,
                distraction_alerts: true,
                email_reports: true,
            },
        ]
    }

    /// The full demo setup: demo roster plus the scripted scenarios.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config(
                "feed.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.start_probability) {
            return Err(Error::Config(
                "feed.start_probability must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.break_interval_secs <= 0 {
            return Err(Error::Config(
                "feed.break_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.recent_alert_cap == 0 {
            return Err(Error::Config(
                "feed.recent_alert_cap must be greater than zero".to_string(),
            ));
        }
        for scenario in &self.scenarios {
            if !self.roster.iter().any(|c| c.id == scenario.child_id) {
                return Err(Error::Config(format!(
                    "scenario references unknown child '{}'; add it to feed.roster or drop the scenario",
                    scenario.child_id
                )));
            }
        }
        Ok(())
    }
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_start_probability() -> f64 {
    0.3
}

fn default_break_interval_secs() -> i64 {
    2700
}

fn default_recent_alert_cap() -> usize {
    10
}

fn default_scenarios() -> Vec<ScenarioProfile> {
    demo_scenarios(&FeedConfig::demo_roster())
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.feed.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/studypulse/config.toml` (~/.config/studypulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("studypulse").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/studypulse/` (~/.local/state/studypulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("studypulse")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/studypulse/studypulse.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("studypulse.log")
    }
}
