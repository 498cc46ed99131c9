//! Shared harness for the `sk` end-to-end tests.
#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

pub const ADMIN: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Build a Command targeting the `sk` binary, rooted in `dir`, acting as `user`.
pub fn sk(dir: &Path, user: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sk"));
    cmd.current_dir(dir);
    cmd.env("SHEETRACK_USER", user);
    cmd.env("SHEETRACK_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("SHEETRACK_EMAIL");
    cmd.env_remove("FORMAT");
    cmd
}

/// Run `sk --json <args>` and parse stdout, asserting success.
pub fn json_ok(dir: &Path, user: &str, args: &[&str]) -> Value {
    let output = sk(dir, user)
        .arg("--json")
        .args(args)
        .output()
        .expect("sk should not crash");
    assert!(
        output.status.success(),
        "`sk {}` failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

/// Run `sk --json <args>`, assert failure, and return the `error` object from stderr.
pub fn json_err(dir: &Path, user: &str, args: &[&str]) -> Value {
    let output = sk(dir, user)
        .arg("--json")
        .args(args)
        .output()
        .expect("sk should not crash");
    assert!(
        !output.status.success(),
        "`sk {}` should fail, got: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout)
    );
    let value: Value =
        serde_json::from_slice(&output.stderr).expect("stderr should be valid JSON");
    value["error"].clone()
}

/// Initialized project with `admin` signed in as an admin.
pub fn admin_project() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    sk(dir.path(), ADMIN).arg("init").assert().success();
    std::fs::write(
        dir.path().join(".sheetrack/config.toml"),
        format!(
            "[access]\nadmin_emails = [\"{ADMIN_EMAIL}\"]\n\n[progress]\nutc_offset_minutes = 0\ndaily_target = 2\n"
        ),
    )
    .expect("write config");
    let login = json_ok(dir.path(), ADMIN, &["--email", ADMIN_EMAIL, "login"]);
    assert_eq!(login["role"], "admin");
    dir
}

/// Create an entity as admin and return its key.
pub fn create(dir: &Path, kind: &str, parent: Option<&str>, title: &str) -> String {
    let url = format!("https://leetcode.com/problems/{}", title.replace(' ', "-"));
    let mut args = vec!["create", kind, "--title", title];
    if let Some(parent) = parent {
        args.extend(["--parent", parent]);
    }
    if kind == "problem" {
        args.extend(["--url", url.as_str()]);
    }
    let json = json_ok(dir, ADMIN, &args);
    assert_eq!(json["kind"], kind);
    json["entity"]["id"]
        .as_str()
        .expect("created entity should have an id")
        .to_string()
}

/// Sheet → topic → sub-pattern with `problems` problems. Returns (sheet, topic, sub-pattern, problems).
pub fn seed_sheet(dir: &Path, problems: usize) -> (String, String, String, Vec<String>) {
    let sheet = create(dir, "sheet", None, "Blind 75");
    let topic = create(dir, "topic", Some(&sheet), "Arrays");
    let sub_pattern = create(dir, "sub-pattern", Some(&topic), "Two Pointers");
    let ids = (0..problems)
        .map(|i| create(dir, "problem", Some(&sub_pattern), &format!("Problem {i}")))
        .collect();
    (sheet, topic, sub_pattern, ids)
}

/// Keys of a `sk list --parent` listing, in listed order.
pub fn listed_ids(dir: &Path, parent: &str) -> Vec<String> {
    let json = json_ok(dir, ADMIN, &["list", "--parent", parent]);
    json["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}
