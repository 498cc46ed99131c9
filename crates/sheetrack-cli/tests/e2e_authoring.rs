//! E2E CLI tests for catalog authoring:
//! - project bootstrap and the not-initialized error
//! - admin gating of authoring commands
//! - append ordering, moves and the delete guard
//! - all-or-nothing batch import
//!
//! Each test runs `sk` as a subprocess in an isolated temp directory.

mod common;

use common::{ADMIN, admin_project, create, json_err, json_ok, listed_ids, seed_sheet, sk};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn init_reports_and_refuses_to_run_twice() {
    let dir = TempDir::new().expect("temp dir");
    sk(dir.path(), ADMIN)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    assert!(dir.path().join(".sheetrack/sheetrack.db").is_file());

    sk(dir.path(), ADMIN)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn commands_outside_a_project_fail_with_not_initialized() {
    let dir = TempDir::new().expect("temp dir");
    let err = json_err(dir.path(), ADMIN, &["list"]);
    assert_eq!(err["error_code"], "E1001");
    assert!(
        err["suggestion"]
            .as_str()
            .is_some_and(|s| s.contains("sk init"))
    );
}

#[test]
fn non_admin_cannot_author() {
    let dir = admin_project();
    json_ok(dir.path(), "bob", &["login"]);

    let err = json_err(dir.path(), "bob", &["create", "sheet", "--title", "Mine"]);
    assert_eq!(err["error_code"], "E2004");

    let sheets = json_ok(dir.path(), "bob", &["list"]);
    assert_eq!(sheets["items"].as_array().map(Vec::len), Some(0));
}

#[test]
fn unknown_user_is_pointed_at_login() {
    let dir = admin_project();
    let err = json_err(dir.path(), "stranger", &["create", "sheet", "--title", "X"]);
    assert_eq!(err["error_code"], "E2001");
    assert!(
        err["suggestion"]
            .as_str()
            .is_some_and(|s| s.contains("sk login"))
    );
}

#[test]
fn children_append_in_creation_order() {
    let dir = admin_project();
    let sheet = create(dir.path(), "sheet", None, "Blind 75");
    let first = create(dir.path(), "topic", Some(&sheet), "Arrays");
    let second = create(dir.path(), "topic", Some(&sheet), "Graphs");

    let listing = json_ok(dir.path(), ADMIN, &["list", "--parent", &sheet]);
    assert_eq!(listing["kind"], "topics");
    let items = listing["items"].as_array().expect("items");
    assert_eq!(items[0]["id"], first.as_str());
    assert_eq!(items[0]["order"], 1);
    assert_eq!(items[1]["id"], second.as_str());
    assert_eq!(items[1]["order"], 2);
}

#[test]
fn wrong_parent_kind_is_rejected_before_touching_the_store() {
    let dir = admin_project();
    let sheet = create(dir.path(), "sheet", None, "Blind 75");
    let err = json_err(
        dir.path(),
        ADMIN,
        &["create", "problem", "--parent", &sheet, "--title", "Two Sum", "--url", "https://x.io"],
    );
    assert_eq!(err["error_code"], "invalid_id");
}

#[test]
fn moving_up_swaps_with_the_previous_sibling() {
    let dir = admin_project();
    let (_, _, sub_pattern, problems) = seed_sheet(dir.path(), 2);

    let moved = json_ok(dir.path(), ADMIN, &["move", &problems[1], "up"]);
    assert_eq!(moved["result"], "moved");
    assert_eq!(moved["order"], 1);
    assert_eq!(moved["neighbor_id"], problems[0].as_str());
    assert_eq!(moved["neighbor_order"], 2);
    assert_eq!(
        listed_ids(dir.path(), &sub_pattern),
        vec![problems[1].clone(), problems[0].clone()]
    );

    let again = json_ok(dir.path(), ADMIN, &["move", &problems[1], "up"]);
    assert_eq!(again["result"], "no_op");
}

#[test]
fn deleting_a_topic_with_live_children_is_refused() {
    let dir = admin_project();
    let (sheet, topic, sub_pattern, problems) = seed_sheet(dir.path(), 1);

    let err = json_err(dir.path(), ADMIN, &["delete", &topic]);
    assert_eq!(err["error_code"], "E2002");

    json_err(dir.path(), ADMIN, &["delete", &sub_pattern]);
    json_ok(dir.path(), ADMIN, &["delete", &problems[0]]);
    json_ok(dir.path(), ADMIN, &["delete", &sub_pattern]);
    let done = json_ok(dir.path(), ADMIN, &["delete", &topic]);
    assert_eq!(done["ok"], true);
    assert!(listed_ids(dir.path(), &sheet).is_empty());

    // Deleting again is a no-op success.
    json_ok(dir.path(), ADMIN, &["delete", &topic]);
}

#[test]
fn restore_brings_back_a_deleted_sheet() {
    let dir = admin_project();
    let sheet = create(dir.path(), "sheet", None, "Blind 75");
    json_ok(dir.path(), ADMIN, &["delete", &sheet]);

    let live = json_ok(dir.path(), ADMIN, &["list"]);
    assert_eq!(live["items"].as_array().map(Vec::len), Some(0));
    let all = json_ok(dir.path(), ADMIN, &["list", "--all"]);
    assert_eq!(all["items"][0]["is_deleted"], true);

    json_ok(dir.path(), ADMIN, &["restore", &sheet]);
    let live = json_ok(dir.path(), ADMIN, &["list"]);
    assert_eq!(live["items"][0]["id"], sheet.as_str());
}

#[test]
fn rename_changes_the_listed_title() {
    let dir = admin_project();
    let sheet = create(dir.path(), "sheet", None, "Blind 75");
    let topic = create(dir.path(), "topic", Some(&sheet), "Arrays");
    json_ok(dir.path(), ADMIN, &["rename", &topic, "--title", "Arrays & Hashing"]);

    let listing = json_ok(dir.path(), ADMIN, &["list", "--parent", &sheet]);
    assert_eq!(listing["items"][0]["title"], "Arrays & Hashing");
}

#[test]
fn import_is_all_or_nothing() {
    let dir = admin_project();
    let (_, _, sub_pattern, _) = seed_sheet(dir.path(), 0);
    let bad = dir.path().join("bad.json");
    std::fs::write(
        &bad,
        r#"[{"title": "Two Sum", "url": "https://leetcode.com/problems/two-sum", "platform": "LeetCode"},
            {"title": "3Sum", "url": "https://leetcode.com/problems/3sum", "platform": "Codeforces"}]"#,
    )
    .expect("write payload");

    let err = json_err(
        dir.path(),
        ADMIN,
        &["import", "--sub-pattern", &sub_pattern, "--file", bad.to_str().expect("utf8 path")],
    );
    assert_eq!(err["error_code"], "E2003");
    assert!(err["message"].as_str().is_some_and(|m| m.contains("entry 1")));
    assert!(listed_ids(dir.path(), &sub_pattern).is_empty());

    let report = sk(dir.path(), ADMIN)
        .args(["--json", "import", "--sub-pattern", &sub_pattern])
        .write_stdin(
            r#"[{"title": "Two Sum", "url": "https://leetcode.com/problems/two-sum", "platform": "LeetCode", "platformId": "1"},
                {"title": "Subarray Sum", "url": "https://www.geeksforgeeks.org/subarray", "platform": "GFG"}]"#,
        )
        .output()
        .expect("sk should not crash");
    assert!(report.status.success(), "{}", String::from_utf8_lossy(&report.stderr));
    let report: serde_json::Value = serde_json::from_slice(&report.stdout).expect("json");
    assert_eq!(report["imported"], 2);
    assert_eq!(report["problems"][0]["order"], 1);
    assert_eq!(report["problems"][0]["platform_id"], "1");
    assert_eq!(report["problems"][1]["platform"], "GFG");
    assert_eq!(listed_ids(dir.path(), &sub_pattern).len(), 2);
}
