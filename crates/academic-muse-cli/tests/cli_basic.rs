//! Basic CLI E2E tests.
//!
//! Each test runs the `muse` binary against its own temporary HOME so the
//! store and config never leak between tests.

use std::process::Command;

use academic_muse_core::KvStore;
use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    run_cli_with_env(home, args, &[])
}

/// Like [`run_cli`], with extra environment variables set for the child.
fn run_cli_with_env(
    home: &TempDir,
    args: &[&str],
    vars: &[(&str, &str)],
) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_muse"));
    cmd.args(args)
        .current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("MUSE_ENV")
        .env_remove("MUSE_AI_URL")
        .env_remove("MUSE_AI_KEY")
        .env_remove("MUSE_AI_MODEL")
        .env("MUSE_LOG", "error");
    for (name, value) in vars {
        cmd.env(name, value);
    }
    let output = cmd.output().expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_first_run_hint_shown_once() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["theme", "show"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("muse about"));

    let (code, _, stderr) = run_cli(&home, &["theme", "show"]);
    assert_eq!(code, 0);
    assert!(!stderr.contains("Welcome"));
}

#[test]
fn test_about_lists_features() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli(&home, &["about"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Pomodoro"));
    assert!(!stderr.contains("Welcome"));
}

#[test]
fn test_theme_toggle_persists() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_cli(&home, &["theme", "show"]).1.trim(), "light");
    assert_eq!(run_cli(&home, &["theme", "toggle"]).1.trim(), "dark");
    assert_eq!(run_cli(&home, &["theme", "show"]).1.trim(), "dark");
    assert_eq!(run_cli(&home, &["theme", "light"]).1.trim(), "light");
}

#[test]
fn test_progress_week_json() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_cli(&home, &["progress", "add", "30", "--date", "2024-01-01"]).0, 0);
    assert_eq!(run_cli(&home, &["progress", "add", "15", "--date", "2024-01-03"]).0, 0);
    assert_eq!(run_cli(&home, &["progress", "add", "10", "--date", "2024-01-03"]).0, 0);
    // Outside the displayed week.
    assert_eq!(run_cli(&home, &["progress", "add", "99", "--date", "2024-01-08"]).0, 0);

    let (code, stdout, _) = run_cli(&home, &["progress", "week", "--date", "2024-01-02", "--json"]);
    assert_eq!(code, 0);
    let days: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2024-01-01");
    assert_eq!(days[0]["minutes"], 30.0);
    assert_eq!(days[2]["minutes"], 25.0);
    assert_eq!(days[6]["date"], "2024-01-07");
    assert_eq!(days[6]["minutes"], 0.0);
}

#[test]
fn test_progress_rejects_zero_minutes() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["progress", "add", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Please enter a valid duration."));
}

#[test]
fn test_progress_chart() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["progress", "add", "45", "--date", "2024-01-01"]);
    let (code, stdout, _) = run_cli(&home, &["progress", "week", "--date", "2024-01-01"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Mon 01-01"));
    assert!(stdout.contains("Total: 45 min"));
}

#[test]
fn test_reminder_set_list_delete() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_cli(&home, &["reminder", "set", "2", "07:30"]).0, 0);
    let (_, stdout, _) = run_cli(&home, &["reminder", "list"]);
    assert!(stdout.contains("2  07:30"));
    assert!(stdout.contains("1  --:--"));

    assert_eq!(run_cli(&home, &["reminder", "delete", "2"]).0, 0);
    let (_, stdout, _) = run_cli(&home, &["reminder", "list"]);
    assert!(stdout.contains("2  --:--"));
}

#[test]
fn test_reminder_rejects_bad_input() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["reminder", "set", "4", "07:30"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown reminder slot 4"));

    let (code, _, stderr) = run_cli(&home, &["reminder", "set", "1", "25:00"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("expected HH:MM"));
}

#[test]
fn test_session_in_the_past_is_rejected() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["session", "add", "00:00", "00:30"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Session start time must be in the future."));

    let (code, stdout, _) = run_cli(&home, &["session", "list", "--json"]);
    assert_eq!(code, 0);
    let sessions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(sessions.as_array().unwrap().is_empty());
}

#[test]
fn test_session_clear_with_yes() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["session", "clear", "--yes"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("SessionHistoryCleared"));
}

#[test]
fn test_explain_without_endpoint_fails_before_request() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["explain", "Entropy", "--level", "phd"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("MUSE_AI_URL"));
}

#[test]
fn test_explain_blank_topic_is_validation_error() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["explain", "  "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Please enter a topic name."));
}

#[test]
fn test_explain_last_before_any_request() {
    let home = TempDir::new().unwrap();
    let (code, stdout, stderr) = run_cli(&home, &["explain", "--last"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Nothing generated yet"));
}

/// The store the binary opens for this HOME.
fn store_in(home: &TempDir) -> KvStore {
    let dir = home.path().join(".config").join("academic-muse");
    std::fs::create_dir_all(&dir).unwrap();
    KvStore::open_at(&dir.join("muse.db")).unwrap()
}

#[test]
fn test_evaluate_server_error_keeps_previous_feedback() {
    let home = TempDir::new().unwrap();
    store_in(&home)
        .set("understandingFeedback", "earlier feedback")
        .unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body("upstream exploded")
        .create();
    let url = server.url();

    let (code, stdout, stderr) = run_cli_with_env(
        &home,
        &["evaluate", "Plants make food from sunlight."],
        &[("MUSE_AI_URL", url.as_str()), ("MUSE_AI_KEY", "test-key")],
    );
    mock.assert();
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("HTTP 500"));
    assert!(stderr.contains("upstream exploded"));

    let stored = store_in(&home).get("understandingFeedback").unwrap();
    assert_eq!(stored.as_deref(), Some("earlier feedback"));
    let (code, stdout, _) = run_cli(&home, &["evaluate", "--last", "--plain"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "earlier feedback");
}

#[test]
fn test_evaluate_success_replaces_feedback() {
    let home = TempDir::new().unwrap();
    store_in(&home)
        .set("understandingFeedback", "earlier feedback")
        .unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"content":"**Strengths** clear summary"}}]}"#)
        .create();
    let url = server.url();

    let (code, stdout, _) = run_cli_with_env(
        &home,
        &["evaluate", "Plants make food from sunlight.", "--plain"],
        &[("MUSE_AI_URL", url.as_str()), ("MUSE_AI_KEY", "test-key")],
    );
    mock.assert();
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Strengths clear summary");

    let stored = store_in(&home).get("understandingFeedback").unwrap();
    assert_eq!(stored.as_deref(), Some("**Strengths** clear summary"));
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "timer.default_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    assert_eq!(run_cli(&home, &["config", "set", "reminders.max_snooze", "5"]).0, 0);
    let (_, stdout, _) = run_cli(&home, &["config", "get", "reminders.max_snooze"]);
    assert_eq!(stdout.trim(), "5");

    let (code, _, _) = run_cli(&home, &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
}

#[test]
fn test_timer_rejects_out_of_range_duration() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["timer", "run", "--minutes", "10"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("between 25 and 120 minutes"));
}
