//! E2E CLI tests for learner progress:
//! - solve/unsolve outcomes and streak counters
//! - cross-sheet stats and the per-sheet breakdown in `sk show`
//! - notes kept apart from progress
//! - admin oversight listing

mod common;

use common::{ADMIN, admin_project, json_err, json_ok, seed_sheet, sk};
use predicates::prelude::*;

const LEARNER: &str = "ada";

#[test]
fn solving_two_of_three_reports_67_percent() {
    let dir = admin_project();
    let (sheet, _, _, problems) = seed_sheet(dir.path(), 3);
    json_ok(dir.path(), LEARNER, &["login"]);

    let first = json_ok(dir.path(), LEARNER, &["solve", &problems[0]]);
    assert_eq!(first["outcome"], "started");
    let second = json_ok(dir.path(), LEARNER, &["solve", &problems[2]]);
    assert_eq!(second["outcome"], "same_day");

    let stats = json_ok(dir.path(), LEARNER, &["stats"]);
    assert_eq!(stats["sheets"][0]["sheet_id"], sheet.as_str());
    assert_eq!(stats["sheets"][0]["solved"], 2);
    assert_eq!(stats["sheets"][0]["total"], 3);
    assert_eq!(stats["sheets"][0]["percent"], 67);
    assert_eq!(stats["overall_percent"], 67);
}

#[test]
fn solving_twice_leaves_progress_unchanged() {
    let dir = admin_project();
    let (_, _, _, problems) = seed_sheet(dir.path(), 1);
    json_ok(dir.path(), LEARNER, &["login"]);

    json_ok(dir.path(), LEARNER, &["solve", &problems[0]]);
    let again = json_ok(dir.path(), LEARNER, &["solve", &problems[0]]);
    assert_eq!(again["outcome"], "already_solved");
    assert_eq!(again["profile"]["streak"]["current"], 1);
    assert_eq!(again["profile"]["streak"]["max"], 1);
}

#[test]
fn solving_a_deleted_problem_is_not_found() {
    let dir = admin_project();
    let (_, _, _, problems) = seed_sheet(dir.path(), 1);
    json_ok(dir.path(), LEARNER, &["login"]);
    json_ok(dir.path(), ADMIN, &["delete", &problems[0]]);

    let err = json_err(dir.path(), LEARNER, &["solve", &problems[0]]);
    assert_eq!(err["error_code"], "E2001");
}

#[test]
fn unsolve_keeps_the_streak() {
    let dir = admin_project();
    let (_, _, _, problems) = seed_sheet(dir.path(), 1);
    json_ok(dir.path(), LEARNER, &["login"]);
    json_ok(dir.path(), LEARNER, &["solve", &problems[0]]);

    let report = json_ok(dir.path(), LEARNER, &["unsolve", &problems[0]]);
    assert_eq!(report["removed"], true);
    assert_eq!(report["profile"]["streak"]["current"], 1);

    let noop = json_ok(dir.path(), LEARNER, &["unsolve", &problems[0]]);
    assert_eq!(noop["removed"], false);

    let stats = json_ok(dir.path(), LEARNER, &["stats"]);
    assert_eq!(stats["overall"]["solved"], 0);
}

#[test]
fn solve_without_login_suggests_signing_in() {
    let dir = admin_project();
    let (_, _, _, problems) = seed_sheet(dir.path(), 1);

    sk(dir.path(), LEARNER)
        .args(["solve", &problems[0]])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sk login"));
}

#[test]
fn show_marks_solved_problems_for_the_user() {
    let dir = admin_project();
    let (sheet, topic, _, problems) = seed_sheet(dir.path(), 2);
    json_ok(dir.path(), LEARNER, &["login"]);
    json_ok(dir.path(), LEARNER, &["solve", &problems[1]]);

    let view = json_ok(dir.path(), LEARNER, &["show", &sheet]);
    assert_eq!(view["sheet"]["id"], sheet.as_str());
    assert_eq!(view["topics"][0]["id"], topic.as_str());
    assert_eq!(
        view["topics"][0]["sub_patterns"][0]["problems"]
            .as_array()
            .map(Vec::len),
        Some(2)
    );
    assert_eq!(view["progress"]["solved"][0], problems[1].as_str());
    assert_eq!(view["progress"]["breakdown"]["solved"], 1);
    assert_eq!(view["progress"]["breakdown"]["total"], 2);
    assert_eq!(view["progress"]["breakdown"]["topics"][0]["solved"], 1);
}

#[test]
fn show_without_a_user_omits_progress() {
    let dir = admin_project();
    let (sheet, _, _, _) = seed_sheet(dir.path(), 1);

    let output = sk(dir.path(), ADMIN)
        .env_remove("SHEETRACK_USER")
        .env_remove("USER")
        .args(["--json", "show", &sheet])
        .output()
        .expect("sk should not crash");
    assert!(output.status.success());
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert!(view.get("progress").is_none());
}

#[test]
fn notes_do_not_touch_progress() {
    let dir = admin_project();
    let (sheet, _, _, problems) = seed_sheet(dir.path(), 1);
    json_ok(dir.path(), LEARNER, &["login"]);

    let saved = json_ok(dir.path(), LEARNER, &["note", "set", &problems[0], "sort first"]);
    assert_eq!(saved["content"], "sort first");
    let shown = json_ok(dir.path(), LEARNER, &["note", "show", &problems[0]]);
    assert_eq!(shown["content"], "sort first");

    let stats = json_ok(dir.path(), LEARNER, &["stats"]);
    assert_eq!(stats["overall"]["solved"], 0);
    let view = json_ok(dir.path(), LEARNER, &["show", &sheet]);
    assert_eq!(view["progress"]["notes"][problems[0].as_str()], "sort first");

    // Notes are private per user.
    json_ok(dir.path(), "bob", &["login"]);
    let listed = json_ok(dir.path(), "bob", &["note", "list"]);
    assert_eq!(listed.as_object().map(serde_json::Map::len), Some(0));
}

#[test]
fn profile_reports_todays_goal() {
    let dir = admin_project();
    let (_, _, _, problems) = seed_sheet(dir.path(), 2);
    json_ok(dir.path(), LEARNER, &["login", "--name", "Ada"]);
    json_ok(dir.path(), LEARNER, &["solve", &problems[0]]);

    let profile = json_ok(dir.path(), LEARNER, &["profile"]);
    assert_eq!(profile["profile"]["display_name"], "Ada");
    assert_eq!(profile["today"]["target"], 2);
    assert_eq!(profile["today"]["solved"], 1);
    assert_eq!(profile["today"]["percent"], 50);
    assert_eq!(profile["overall"]["total"], 2);
    assert_eq!(profile["activity"][0]["count"], 1);
}

#[test]
fn users_listing_is_admin_only() {
    let dir = admin_project();
    json_ok(dir.path(), LEARNER, &["login"]);

    let err = json_err(dir.path(), LEARNER, &["users"]);
    assert_eq!(err["error_code"], "E2004");

    let rows = json_ok(dir.path(), ADMIN, &["users"]);
    let uids: Vec<&str> = rows
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|r| r["uid"].as_str())
        .collect();
    assert!(uids.contains(&ADMIN));
    assert!(uids.contains(&LEARNER));
}

#[test]
fn listed_admin_email_promotes_an_existing_user() {
    let dir = admin_project();
    let first = json_ok(dir.path(), LEARNER, &["login"]);
    assert_eq!(first["role"], "user");

    std::fs::write(
        dir.path().join(".sheetrack/config.toml"),
        "[access]\nadmin_emails = [\"ADA@example.com\"]\n",
    )
    .expect("rewrite config");
    let again = json_ok(dir.path(), LEARNER, &["--email", "ada@example.com", "login"]);
    assert_eq!(again["role"], "admin");
    assert_eq!(again["promoted"], true);
    assert_eq!(again["created"], false);
}
