//! studypulse - study-monitoring demo feed runner
//!
//! Streams the telemetry feed the parent dashboard consumes, and exposes the
//! rest of the demo surface (roster, scheduling, campus integrations) for
//! poking from a terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use studypulse_core::format::format_relative_time;
use studypulse_core::integrations::{SmartParkClient, VoluTrackClient};
use studypulse_core::{
    ChildProfile, Config, ScheduledSession, Snapshot, TelemetryFeed, EVENT_UPDATE,
};

#[derive(Parser, Debug)]
#[command(name = "studypulse")]
#[command(about = "StudyPulse - study monitoring demo feed")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the telemetry feed and stream snapshots
    Run {
        /// Stop after this many snapshots (runs until Ctrl-C when omitted)
        #[arg(long)]
        ticks: Option<u64>,

        /// Emit one JSON snapshot per line instead of summaries
        #[arg(long)]
        json: bool,

        /// Scope goal progress and alerts to this child id
        #[arg(long)]
        child: Option<String>,

        /// Override the configured tick interval
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// List the monitored children
    Roster,

    /// Schedule a study session and show the child's updated plan
    Schedule {
        /// Child id the session is for
        #[arg(long)]
        child: String,

        /// Subject to study
        #[arg(long)]
        subject: String,

        /// Hours from now the session starts
        #[arg(long, default_value_t = 24)]
        in_hours: i64,

        /// Planned length in minutes
        #[arg(long, default_value_t = 60)]
        minutes: i64,

        /// Free-form note attached to the plan
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show parking lots and reservations (SmartPark demo data)
    Parking {
        /// Student id to look up reservations for
        #[arg(long)]
        student: Option<String>,
    },

    /// Show volunteering metrics and open postings (VoluTrack demo data)
    Volunteer {
        /// Student id to look up metrics for
        #[arg(long)]
        student: Option<String>,

        /// Only list postings in this category
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = studypulse_core::logging::init(&config.logging).ok();
    tracing::info!("studypulse CLI starting");

    match args.command {
        Command::Run {
            ticks,
            json,
            child,
            interval_ms,
        } => run_feed(config, ticks, json, child, interval_ms),
        Command::Roster => {
            print_roster(&config.feed.roster);
            Ok(())
        }
        Command::Schedule {
            child,
            subject,
            in_hours,
            minutes,
            notes,
        } => schedule(config, child, subject, in_hours, minutes, notes),
        Command::Parking { student } => {
            print_parking(student.as_deref());
            Ok(())
        }
        Command::Volunteer { student, category } => {
            print_volunteering(student.as_deref(), category.as_deref());
            Ok(())
        }
    }
}

fn run_feed(
    mut config: Config,
    ticks: Option<u64>,
    json: bool,
    child: Option<String>,
    interval_ms: Option<u64>,
) -> Result<()> {
    if let Some(interval) = interval_ms {
        config.feed.tick_interval_ms = interval;
    }
    let roster = config.feed.roster.clone();

    let feed = TelemetryFeed::new(config.feed).context("failed to build telemetry feed")?;
    if let Some(child_id) = &child {
        feed.select_child(child_id);
    }

    let (tx, rx) = mpsc::channel::<Snapshot>();
    feed.subscribe(EVENT_UPDATE, move |snapshot| {
        let _ = tx.send(snapshot.clone());
    });

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    feed.start().context("failed to start telemetry feed")?;
    tracing::info!(ticks = ?ticks, json, "streaming snapshots");

    let mut seen = 0u64;
    loop {
        if interrupted.load(Ordering::SeqCst) {
            break;
        }
        if let Some(limit) = ticks {
            if seen >= limit {
                break;
            }
        }
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(snapshot) => {
                seen += 1;
                if json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    println!("{}", render_summary(&snapshot, &roster));
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    feed.stop();
    Ok(())
}

/// One human-readable line per snapshot.
fn render_summary(snapshot: &Snapshot, roster: &[ChildProfile]) -> String {
    let name_of = |child_id: &str| -> String {
        roster
            .iter()
            .find(|c| c.id == child_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| child_id.to_string())
    };

    let mut parts: Vec<String> = Vec::new();
    if snapshot.current_sessions.is_empty() {
        parts.push("no active sessions".to_string());
    }
    for session in &snapshot.current_sessions {
        parts.push(format!(
            "{} {} {} (started {})",
            name_of(&session.child_id),
            session.duration,
            session.focus_level,
            format_relative_time(session.start_time),
        ));
    }
    parts.push(format!(
        "progress {}m (goal {}m daily / {}m weekly, week {}m)",
        snapshot.study_goals.current,
        snapshot.study_goals.daily,
        snapshot.study_goals.weekly,
        snapshot.study_goals.weekly_progress,
    ));
    parts.push(format!("{} alerts", snapshot.recent_alerts.len()));
    parts.join(" | ")
}

fn print_roster(roster: &[ChildProfile]) {
    for child in roster {
        println!(
            "{:<8} {} ({}) - {} min/day, {} min/week",
            child.id, child.name, child.grade, child.daily_goal, child.weekly_goal
        );
    }
}

fn schedule(
    config: Config,
    child: String,
    subject: String,
    in_hours: i64,
    minutes: i64,
    notes: Option<String>,
) -> Result<()> {
    let feed = TelemetryFeed::new(config.feed).context("failed to build telemetry feed")?;

    let id = feed.schedule_session(ScheduledSession {
        id: String::new(),
        child_id: child.clone(),
        subject: subject.clone(),
        start_time: chrono::Utc::now() + chrono::Duration::hours(in_hours),
        duration: minutes,
        notes,
        is_recurring: false,
        recurring_days: None,
    });
    println!("Scheduled {subject} for {child}: {id}");

    let snapshot = feed.snapshot();
    let upcoming: Vec<&ScheduledSession> = snapshot
        .scheduled_sessions
        .iter()
        .filter(|s| s.child_id == child)
        .collect();
    println!("Upcoming sessions for {child}: {}", upcoming.len());
    for session in upcoming {
        println!(
            "  {} - {} min at {}",
            session.subject,
            session.duration,
            session.start_time.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn print_parking(student: Option<&str>) {
    let client = SmartParkClient::new("demo-api-key");

    println!("Parking lots:");
    for lot in client.available_lots() {
        println!(
            "  {} - {} ({}/{} spaces free, ${:.2}/hr)",
            lot.name, lot.address, lot.available_spaces, lot.total_spaces, lot.hourly_rate
        );
    }

    let student = student.unwrap_or("child1");
    let reservations = client.reservations(student);
    println!("Reservations for {student}: {}", reservations.len());
    for reservation in &reservations {
        println!(
            "  {} space {} (${:.2})",
            reservation.lot_name,
            reservation.space_number.as_deref().unwrap_or("-"),
            reservation.cost
        );
    }
}

fn print_volunteering(student: Option<&str>, category: Option<&str>) {
    let client = VoluTrackClient::new("demo-oauth-token");

    let student = student.unwrap_or("child1");
    let metrics = client.student_metrics(student);
    println!(
        "Volunteering for {student}: {}h across {} activities",
        metrics.total_hours, metrics.activities_completed
    );
    for (category, hours) in &metrics.category_summary {
        println!("  {category}: {hours}h");
    }

    println!("Open postings:");
    for posting in client.postings(category) {
        println!(
            "  {} - {} ({}h, {} spots)",
            posting.title, posting.organization, posting.duration, posting.spots_available
        );
    }
}
