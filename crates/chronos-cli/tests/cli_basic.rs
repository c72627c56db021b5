//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_chronos"))
        .args(args)
        .env("CHRONOS_DATA_DIR", data_dir)
        .env("CHRONOS_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_first_run_lists_default_events() {
    let dir = tempfile::tempdir().unwrap();
    let events = run_json(dir.path(), &["event", "list", "--json"]);
    let titles: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles.len(), 2);
    assert_eq!(titles[0], "Kyoto Trip");
    assert!(titles[1].starts_with("New Year "));
}

#[test]
fn test_event_add_show_delete() {
    let dir = tempfile::tempdir().unwrap();
    let added = run_json(
        dir.path(),
        &[
            "event", "add", "Launch", "--date", "2099-06-01", "--time", "09:30", "--notify",
            "--one-hour", "--sound", "warp", "--json",
        ],
    );
    assert_eq!(added["type"], "EventAdded");
    let id = added["id"].as_str().unwrap().to_string();

    let shown = run_json(dir.path(), &["event", "show", &id[..8], "--json"]);
    assert_eq!(shown["title"], "Launch");
    assert_eq!(shown["notification"]["enabled"], true);
    assert_eq!(shown["notification"]["sound"], "warp");
    assert_eq!(shown["notification"]["triggers"]["one_hour_before"], true);
    assert_eq!(shown["remaining"]["is_past"], false);
    assert_eq!(shown["progress_pct"], 0.0);

    let events = run_json(dir.path(), &["event", "list", "--json"]);
    assert_eq!(events.as_array().unwrap().len(), 3);
    assert_eq!(events[2]["id"], id.as_str());

    let deleted = run_json(dir.path(), &["event", "delete", &id, "--json"]);
    assert_eq!(deleted["type"], "EventDeleted");
    let events = run_json(dir.path(), &["event", "list", "--json"]);
    assert_eq!(events.as_array().unwrap().len(), 2);
}

#[test]
fn test_event_add_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["event", "add", "  ", "--date", "2099-01-01"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(dir.path(), &["event", "add", "Bad", "--date", "01/02/2099"]);
    assert_eq!(code, 1);
}

#[test]
fn test_delete_unknown_event_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["event", "delete", "does-not-exist"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Event not found"));
}

#[test]
fn test_watch_once_fires_completed_event_once() {
    let dir = tempfile::tempdir().unwrap();
    run_json(
        dir.path(),
        &["event", "add", "Past", "--date", "2000-01-01", "--notify", "--json"],
    );

    let (code, stdout, _) = run_cli(dir.path(), &["watch", "--once", "--mute", "--json"]);
    assert_eq!(code, 0);
    let firings: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0]["type"], "AlertFired");
    assert_eq!(firings[0]["threshold"], "completion");

    let (_, again, _) = run_cli(dir.path(), &["watch", "--once", "--mute", "--json"]);
    assert!(again.trim().is_empty());
}

#[test]
fn test_notify_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let toggled = run_json(dir.path(), &["event", "notify", "2", "on", "--json"]);
    assert_eq!(toggled["type"], "NotificationsToggled");
    assert_eq!(toggled["enabled"], true);

    let shown = run_json(dir.path(), &["event", "show", "2", "--json"]);
    assert_eq!(shown["notification"]["enabled"], true);
}

#[test]
fn test_theme_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (_, current, _) = run_cli(dir.path(), &["theme", "get"]);
    assert_eq!(current.trim(), "obsidian");

    let (code, _, _) = run_cli(dir.path(), &["theme", "set", "aurora"]);
    assert_eq!(code, 0);
    let (_, current, _) = run_cli(dir.path(), &["theme", "get"]);
    assert_eq!(current.trim(), "aurora");

    let (code, _, _) = run_cli(dir.path(), &["theme", "set", "plaid"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (_, value, _) = run_cli(dir.path(), &["config", "get", "notifier.tick_interval_secs"]);
    assert_eq!(value.trim(), "5");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "notifier.tick_interval_secs", "2"]);
    assert_eq!(code, 0);
    let (_, value, _) = run_cli(dir.path(), &["config", "get", "notifier.tick_interval_secs"]);
    assert_eq!(value.trim(), "2");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
}

#[test]
fn test_sound_list() {
    let dir = tempfile::tempdir().unwrap();
    let sounds = run_json(dir.path(), &["sound", "list", "--json"]);
    let sounds = sounds.as_array().unwrap();
    assert_eq!(sounds.len(), 10);
    assert_eq!(sounds[0]["id"], "glass");
}
