//! CLI smoke tests
//!
//! These exercise the binary surface only - nothing here talks to an LLM
//! or a calendar.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("hc")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("times"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_plan_requires_goal_and_weeks() {
    Command::cargo_bin("hc")
        .unwrap()
        .args(["plan", "--weeks", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--goal"));
}

#[test]
fn test_push_rejects_bad_start_date() {
    Command::cargo_bin("hc")
        .unwrap()
        .args(["push", "plan.json", "--start-date", "not-a-date"])
        .assert()
        .failure();
}

#[test]
fn test_show_missing_file_fails() {
    Command::cargo_bin("hc")
        .unwrap()
        .args(["show", "definitely_missing_habit_plan.json"])
        .assert()
        .failure();
}
