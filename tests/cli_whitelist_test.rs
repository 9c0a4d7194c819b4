//! Integration tests for `mergegate whitelist` and `mergegate check`.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_whitelist_live_json() {
    let env = TestEnv::new();
    env.write("access.txt", "alice\nbob\n");
    env.write("whitelist.txt", "# manual\ncarol\n");

    env.with_file_source()
        .arg("whitelist")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""live":true"#))
        .stdout(predicate::str::contains(r#""users":["alice","bob","carol"]"#))
        .stdout(predicate::str::contains(r#""override_label":"ok-to-merge""#));
}

#[test]
fn test_whitelist_falls_back_to_committers_snapshot() {
    let env = TestEnv::new();
    env.write("committers.txt", "# generated\nold-committer\n");
    env.write("whitelist.txt", "carol\n");

    env.with_file_source()
        .arg("whitelist")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""live":false"#))
        .stdout(predicate::str::contains("fallback_reason"))
        .stdout(predicate::str::contains(r#""users":["carol","old-committer"]"#))
        .stderr(predicate::str::contains("Falling back to static committers list"));
}

#[test]
fn test_whitelist_human_output() {
    let env = TestEnv::new();
    env.write("access.txt", "alice\n");

    env.with_file_source()
        .args(["-H", "whitelist", "--whitelist-override-label", "merge-anyway"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 users may auto-merge (live"))
        .stdout(predicate::str::contains("  alice"))
        .stdout(predicate::str::contains("'merge-anyway'"));
}

#[test]
fn test_whitelist_additional_users() {
    let env = TestEnv::new();
    env.write("access.txt", "alice\n");

    env.with_file_source()
        .args(["whitelist", "--additional-user", "release-bot"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""users":["alice","release-bot"]"#));
}

#[test]
fn test_whitelist_from_config_file() {
    let env = TestEnv::new();
    env.write("upstream.txt", "alice\n");
    env.write(
        "mergegate.toml",
        "source_file = \"upstream.txt\"\nadditional_users = [\"bot\"]\noverride_label = \"ship-it\"\n",
    );

    env.mergegate()
        .args(["--config", "mergegate.toml", "whitelist"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source":"file:upstream.txt""#))
        .stdout(predicate::str::contains(r#""users":["alice","bot"]"#))
        .stdout(predicate::str::contains(r#""override_label":"ship-it""#));
}

#[test]
fn test_invalid_config_file_reports_error() {
    let env = TestEnv::new();
    env.write("mergegate.toml", "unknown_key = 1\n");

    env.mergegate()
        .args(["--config", "mergegate.toml", "whitelist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn test_check_allowed_user() {
    let env = TestEnv::new();
    env.write("access.txt", "alice\n");

    env.with_file_source()
        .args(["check", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""allowed":true"#));
}

#[test]
fn test_check_whitelisted_user() {
    let env = TestEnv::new();
    env.write("access.txt", "alice\n");
    env.write("whitelist.txt", "carol\n");

    env.with_file_source()
        .args(["-H", "check", "carol"])
        .assert()
        .success()
        .stdout(predicate::str::contains("carol may auto-merge"));
}

#[test]
fn test_check_denied_user() {
    let env = TestEnv::new();
    env.write("access.txt", "alice\n");

    env.with_file_source()
        .args(["-H", "check", "mallory"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mallory may not auto-merge"));
}

#[test]
fn test_check_invalid_github_repo() {
    let env = TestEnv::new();

    env.mergegate()
        .args(["--github-repo", "not-a-slug", "check", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected owner/name"));
}
