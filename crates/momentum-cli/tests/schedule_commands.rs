//! Calendar, defer, focus and config commands end to end.

mod common;

use common::{add_task, parse_json, run_cli, run_cli_failure, run_cli_success};
use tempfile::TempDir;

#[test]
fn test_defer_avoids_calendar_blocks() {
    let home = TempDir::new().unwrap();
    let id = add_task(home.path(), "Essay", "2026-03-02T22:00:00+09:00", 60, 20);
    run_cli_success(
        home.path(),
        &["calendar", "add", "Lecture", "--date", "2026-3-2", "--start", "09:00", "--end", "10:30"],
    );

    let outcome = parse_json(&run_cli_success(
        home.path(),
        &["defer", &id, "--at", "2026-03-02T07:00:00+09:00", "--json"],
    ));
    // 9:00 JST collides with the lecture; the next 2-hour step is 11:00 JST.
    assert_eq!(outcome["rescheduledAt"], "2026-03-02T02:00:00Z");
    assert_eq!(outcome["tier"], "urgent");
    assert_eq!(outcome["reason"], "Deadline is close; moved to today at 11:00.");

    let task = parse_json(&run_cli_success(home.path(), &["task", "show", &id]));
    assert_eq!(task["status"], "postponed");
    assert_eq!(task["rescheduledTo"], "2026-03-02T02:00:00Z");

    let day = parse_json(&run_cli_success(
        home.path(),
        &["calendar", "list", "--date", "2026-03-02", "--json"],
    ));
    let blocks = day["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1]["label"], "Essay");
    assert_eq!(blocks[1]["type"], "work");
    assert_eq!(blocks[1]["start"], 660);
    assert_eq!(blocks[1]["end"], 780);

    // Postponed tasks cannot be deferred again until reactivated
    run_cli_failure(home.path(), &["defer", &id, "--at", "2026-03-02T07:00:00+09:00"]);
    run_cli_success(home.path(), &["task", "reactivate", &id]);
}

#[test]
fn test_defer_reports_no_slot() {
    let home = TempDir::new().unwrap();
    let id = add_task(home.path(), "Essay", "2026-03-02T22:00:00+09:00", 60, 20);
    run_cli_success(home.path(), &["config", "set", "scheduling.max_conflict_steps", "1"]);
    run_cli_success(
        home.path(),
        &["calendar", "add", "Exam", "--date", "2026-3-2", "--start", "08:00", "--end", "20:00"],
    );

    let stderr = run_cli_failure(home.path(), &["defer", &id, "--at", "2026-03-02T07:00:00+09:00"]);
    assert!(stderr.contains("error:"), "{stderr}");
    let task = parse_json(&run_cli_success(home.path(), &["task", "show", &id]));
    assert_eq!(task["status"], "pending");
}

#[test]
fn test_calendar_conflicts_and_suggest() {
    let home = TempDir::new().unwrap();
    run_cli_success(
        home.path(),
        &["calendar", "add", "Class", "--date", "2026-3-2", "--start", "12:30", "--end", "14:00"],
    );

    let out = run_cli_success(
        home.path(),
        &["calendar", "conflicts", "--at", "2026-03-02T12:00:00+09:00"],
    );
    assert!(out.contains("moved to 2026-03-02T14:00:00+09:00"), "{out}");
    let out = run_cli_success(
        home.path(),
        &["calendar", "conflicts", "--at", "2026-03-02T08:00:00+09:00"],
    );
    assert!(out.starts_with("free"), "{out}");

    // The ON window (12:00-13:00) overlaps the class; only OFF is suggested.
    let out = run_cli_success(
        home.path(),
        &["calendar", "suggest", "--date", "2026-3-2", "--apply"],
    );
    assert!(out.contains("16:30-18:00"), "{out}");
    assert!(!out.contains("12:00-13:00"), "{out}");
    let day = parse_json(&run_cli_success(
        home.path(),
        &["calendar", "list", "--date", "2026-3-2", "--json"],
    ));
    assert_eq!(day["blocks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_calendar_recurring_week() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(
        home.path(),
        &[
            "calendar", "recurring", "Seminar", "--week-of", "2026-3-4", "--days", "1,3",
            "--start", "10:40", "--end", "12:10",
        ],
    );
    assert!(out.contains("Created 2 block(s)"), "{out}");

    let week = parse_json(&run_cli_success(
        home.path(),
        &["calendar", "list", "--date", "2026-3-4", "--view", "week", "--json"],
    ));
    let days = week.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2026-3-1");
    assert_eq!(days[1]["blocks"][0]["recurring"], true);
    assert_eq!(days[3]["blocks"][0]["label"], "Seminar");
    assert!(days[2]["blocks"].as_array().unwrap().is_empty());

    run_cli_failure(
        home.path(),
        &["calendar", "recurring", "X", "--days", "7", "--start", "10:00", "--end", "11:00"],
    );
}

#[test]
fn test_focus_cycle() {
    let home = TempDir::new().unwrap();
    let id = add_task(home.path(), "Reading", "2026-12-01T09:00:00Z", 50, 50);

    let out = run_cli_success(home.path(), &["focus", "on"]);
    assert!(out.contains("ModeChanged"), "{out}");

    let out = run_cli_success(home.path(), &["focus", "start", &id]);
    assert!(out.contains("FocusStarted"), "{out}");
    let status = parse_json(&run_cli_success(home.path(), &["focus", "status"]));
    assert_eq!(status["mode"], "focusing");
    assert_eq!(status["task_id"], id.as_str());
    assert!(status["remaining_secs"].as_i64().unwrap() > 0);

    // A second start while focusing fails
    run_cli_failure(home.path(), &["focus", "start", &id]);

    let out = run_cli_success(home.path(), &["focus", "off"]);
    assert!(out.contains("FocusAbandoned"), "{out}");
    let status = parse_json(&run_cli_success(home.path(), &["focus", "status"]));
    assert_eq!(status["mode"], "off");

    let task = parse_json(&run_cli_success(home.path(), &["task", "show", &id]));
    assert_eq!(task["status"], "in_progress");
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.focus_minutes"]).trim(),
        "25"
    );
    run_cli_success(home.path(), &["config", "set", "session.focus_minutes", "50"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.focus_minutes"]).trim(),
        "50"
    );

    run_cli_failure(home.path(), &["config", "get", "session.nope"]);
    run_cli_failure(home.path(), &["config", "set", "on_off.on_start", "25:99"]);

    let list = run_cli_success(home.path(), &["config", "list"]);
    assert!(list.contains("scheduling.max_conflict_steps = 84"), "{list}");

    run_cli_success(home.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.focus_minutes"]).trim(),
        "25"
    );
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("momentum"));
}
