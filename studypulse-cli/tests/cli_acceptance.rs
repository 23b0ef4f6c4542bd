//! Acceptance tests for the studypulse CLI
//!
//! Each test runs the real binary in an isolated XDG environment so user
//! configuration never leaks in.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }
}

fn run_cli(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("studypulse"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute studypulse: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "studypulse {} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        output.status,
        stdout,
        stderr
    );
}

#[test]
fn help_describes_the_feed() {
    let env = CliTestEnv::new();
    let output = run_cli(&env, &["--help"]);
    assert_success(&["--help"], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("study monitoring demo feed"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("roster"));
}

#[test]
fn roster_lists_demo_children() {
    let env = CliTestEnv::new();
    let output = run_cli(&env, &["roster"]);
    assert_success(&["roster"], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alex Thompson"));
    assert!(stdout.contains("Sarah Thompson"));
    assert!(stdout.contains("Michael Thompson"));
    assert!(stdout.contains("child3"));
}

#[test]
fn run_streams_json_snapshots() {
    let env = CliTestEnv::new();
    let args = ["run", "--ticks", "2", "--interval-ms", "20", "--json"];
    let output = run_cli(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert!(lines.len() >= 2, "expected 2 snapshots, got:\n{stdout}");

    for line in &lines[..2] {
        let snapshot: serde_json::Value =
            serde_json::from_str(line).expect("each line should be a JSON snapshot");
        assert!(snapshot["currentSessions"].is_array());
        assert_eq!(snapshot["isInitialized"], true);
        assert!(snapshot["studyGoals"]["daily"].is_i64());
    }
}

#[test]
fn run_scopes_to_selected_child() {
    let env = CliTestEnv::new();
    let args = [
        "run",
        "--ticks",
        "1",
        "--interval-ms",
        "20",
        "--json",
        "--child",
        "child2",
    ];
    let output = run_cli(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().find(|l| !l.is_empty()).expect("one snapshot");
    let snapshot: serde_json::Value = serde_json::from_str(line).unwrap();

    // Sarah's scripted figures: 80% of 90 daily, 50% of 450 weekly.
    assert_eq!(snapshot["studyGoals"]["daily"], 90);
    assert_eq!(snapshot["studyGoals"]["current"], 72);
    assert_eq!(snapshot["studyGoals"]["weeklyProgress"], 225);
}

#[test]
fn schedule_adds_a_session() {
    let env = CliTestEnv::new();
    let args = [
        "schedule",
        "--child",
        "child1",
        "--subject",
        "Biology",
        "--in-hours",
        "5",
        "--minutes",
        "40",
    ];
    let output = run_cli(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Scheduled Biology for child1"));
    assert!(stdout.contains("Biology - 40 min"));
}

#[test]
fn parking_lists_canned_lots() {
    let env = CliTestEnv::new();
    let output = run_cli(&env, &["parking"]);
    assert_success(&["parking"], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("University Main Lot"));
    assert!(stdout.contains("Library Parking Garage"));
    assert!(stdout.contains("Reservations for child1: 1"));

    let output = run_cli(&env, &["parking", "--student", "child2"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Reservations for child2: 0"));
}

#[test]
fn volunteer_filters_postings_by_category() {
    let env = CliTestEnv::new();
    let args = ["volunteer", "--category", "Education"];
    let output = run_cli(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("75h across 12 activities"));
    assert!(stdout.contains("Library Reading Program"));
    assert!(!stdout.contains("Food Bank Distribution"));
}
