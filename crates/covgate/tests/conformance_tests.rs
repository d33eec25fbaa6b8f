//! CLI integration via the JSON interface.

use std::path::Path;

use test_helpers::{covgate_bin, covgate_json, covgate_stdout, run, serve_api};

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

// ── Tiers ───────────────────────────────────────────────────────

#[test]
fn coverage_tier_plain() {
    assert_eq!(covgate_stdout(&["tier", "--coverage", "80"]).trim(), "green #97CA00");
    assert_eq!(
        covgate_stdout(&["tier", "--coverage", "59.9"]).trim(),
        "yellow #DFB317"
    );
}

#[test]
fn execution_time_tier_json() {
    let v = covgate_json(&["tier", "--time-ns", "300000000000", "--json"], 0);
    assert_eq!(v["metric"], "test_execution_time");
    assert_eq!(v["tier"], "yellowgreen");
    assert_eq!(v["color"], "#A4A61D");
}

#[test]
fn ratio_tier_json() {
    let v = covgate_json(&["tier", "--ratio", "0.5", "--json"], 0);
    assert_eq!(v["tier"], "red");
}

#[test]
fn tier_requires_a_metric() {
    run(&mut covgate_bin(), &["tier"], 1);
}

// ── Acceptability ───────────────────────────────────────────────

#[test]
fn acceptable_report_passes() {
    let dir = tempfile::tempdir().unwrap();
    let report = write(
        dir.path(),
        "report.json",
        r#"{"coverage_percent": 85.0, "code_to_test_ratio": 1.1, "test_execution_time_ns": 120000000000}"#,
    );
    let config = write(
        dir.path(),
        ".covgate.yml",
        "coverage:\n  acceptable: 80%\ncodeToTestRatio:\n  acceptable: '1:1'\ntestExecutionTime:\n  acceptable: 5m\n",
    );
    let v = covgate_json(
        &["acceptable", "--report", &report, "--config", &config, "--json"],
        0,
    );
    assert_eq!(v["acceptable"], true);
    assert!(v["error"].is_null());
}

#[test]
fn acceptable_report_fails_with_values() {
    let dir = tempfile::tempdir().unwrap();
    let report = write(dir.path(), "report.json", r#"{"coverage_percent": 79.9}"#);
    let v = covgate_json(
        &[
            "acceptable",
            "--report",
            &report,
            "--coverage-threshold",
            "80%",
            "--json",
        ],
        1,
    );
    assert_eq!(v["acceptable"], false);
    assert_eq!(
        v["error"],
        "code coverage is 79.9%, which is below the accepted 80.0%"
    );
}

#[test]
fn slow_tests_fail_duration_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let report = write(
        dir.path(),
        "report.json",
        r#"{"test_execution_time_ns": 601000000000}"#,
    );
    let out = run(
        &mut covgate_bin(),
        &["acceptable", "--report", &report, "--time-threshold", "10m"],
        1,
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("10m1s"), "{stderr}");
}

#[test]
fn malformed_threshold_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let report = write(dir.path(), "report.json", r#"{"code_to_test_ratio": 1.0}"#);
    let v = covgate_json(
        &[
            "acceptable",
            "--report",
            &report,
            "--ratio-threshold",
            "1:abc",
            "--json",
        ],
        1,
    );
    assert!(v["error"].as_str().unwrap().contains("1:abc"));
}

// ── Conditions ──────────────────────────────────────────────────

struct ActionsRun {
    dir: tempfile::TempDir,
    event_path: String,
}

impl ActionsRun {
    fn new(payload: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let event_path = write(dir.path(), "event.json", payload);
        ActionsRun { dir, event_path }
    }

    fn command(&self, event_name: &str, git_ref: &str) -> std::process::Command {
        let mut cmd = covgate_bin();
        cmd.env("GITHUB_REPOSITORY", "k1LoW/octocov")
            .env("GITHUB_EVENT_NAME", event_name)
            .env("GITHUB_EVENT_PATH", &self.event_path)
            .env("GITHUB_REF", git_ref)
            // Nothing listens here, so API lookups fail fast.
            .env("GITHUB_API_URL", "http://127.0.0.1:9")
            .env("DEPLOY_ENV", "production");
        cmd
    }
}

const PUSH_PAYLOAD: &str =
    r#"{"ref": "refs/heads/main", "repository": {"full_name": "k1LoW/octocov", "default_branch": "main"}}"#;

#[test]
fn empty_condition_needs_no_context() {
    let out = run(&mut covgate_bin(), &["check-if", ""], 0);
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "true");
}

#[test]
fn condition_without_event_fails() {
    let out = run(&mut covgate_bin(), &["check-if", "is_default_branch"], 1);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("GITHUB_EVENT_NAME"), "{stderr}");
}

#[test]
fn condition_on_default_branch_push() {
    let actions = ActionsRun::new(PUSH_PAYLOAD);
    let out = run(
        &mut actions.command("push", "refs/heads/main"),
        &[
            "check-if",
            "is_default_branch && github.event_name == 'push' && env.DEPLOY_ENV == 'production'",
            "--json",
        ],
        0,
    );
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["result"], true);
}

#[test]
fn false_condition_exits_nonzero() {
    let actions = ActionsRun::new(PUSH_PAYLOAD);
    let out = run(
        &mut actions.command("push", "refs/heads/feature"),
        &["check-if", "is_default_branch"],
        1,
    );
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "false");
}

#[test]
fn non_bool_condition_is_an_error() {
    let actions = ActionsRun::new(PUSH_PAYLOAD);
    let out = run(
        &mut actions.command("push", "refs/heads/main"),
        &["check-if", "1"],
        1,
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("must evaluate to bool"), "{stderr}");
}

#[test]
fn scheduled_run_resolves_default_branch_from_api() {
    let api = serve_api(|url| match url {
        "/repos/k1LoW/octocov" => (200, r#"{"default_branch": "main"}"#.to_string()),
        _ => (200, "[]".to_string()),
    });
    let actions = ActionsRun::new(r#"{"schedule": "0 3 * * *"}"#);
    let mut cmd = actions.command("schedule", "refs/heads/main");
    cmd.env("GITHUB_API_URL", &api);
    let out = run(
        &mut cmd,
        &[
            "check-if",
            "github.event_name == 'schedule' && is_default_branch && !is_pull_request",
        ],
        0,
    );
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "true");
}

#[test]
fn scheduled_run_without_api_is_reported() {
    let actions = ActionsRun::new(r#"{"schedule": "0 3 * * *"}"#);
    let out = run(
        &mut actions.command("schedule", "refs/heads/main"),
        &["check-if", "is_default_branch"],
        1,
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("default branch of k1LoW/octocov"), "{stderr}");
}

#[test]
fn missing_repository_is_reported() {
    let actions = ActionsRun::new(PUSH_PAYLOAD);
    let mut cmd = actions.command("push", "refs/heads/main");
    cmd.env_remove("GITHUB_REPOSITORY");
    let out = run(&mut cmd, &["check-if", "is_default_branch"], 1);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("GITHUB_REPOSITORY"), "{stderr}");
}

// ── Action gates ────────────────────────────────────────────────

#[test]
fn gates_json_on_pull_request() {
    let actions = ActionsRun::new(
        r#"{"pull_request": {"number": 5}, "repository": {"full_name": "k1LoW/octocov", "default_branch": "main"}}"#,
    );
    let config = write(
        actions.dir.path(),
        ".covgate.yml",
        "push:\n  if: is_default_branch\ncomment:\n  if: is_pull_request\ndiff:\n  enable: false\n",
    );
    let mut cmd = actions.command("pull_request", "refs/pull/5/merge");
    cmd.env("GITHUB_HEAD_REF", "feature/x");
    let out = run(&mut cmd, &["gates", "--config", &config, "--json"], 0);
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

    assert_eq!(v[0]["action"], "push_badges");
    assert_eq!(v[0]["verdict"], "skip");
    assert_eq!(
        v[0]["reason"],
        "the condition in the `if` section is not met (is_default_branch)"
    );
    assert_eq!(v[1]["action"], "comment");
    assert_eq!(v[1]["verdict"], "run");
    assert_eq!(v[2]["verdict"], "disabled");
    assert_eq!(v[3]["verdict"], "disabled");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Skip pushing badges: the condition in the `if` section is not met"),
        "{stderr}"
    );
}

#[test]
fn blank_repository_flag_falls_back_to_config() {
    let actions = ActionsRun::new(PUSH_PAYLOAD);
    let config = write(
        actions.dir.path(),
        ".covgate.yml",
        "repository: k1LoW/octocov\npush:\n  if: is_default_branch\n",
    );
    let mut cmd = actions.command("push", "refs/heads/main");
    cmd.env_remove("GITHUB_REPOSITORY");
    let out = run(
        &mut cmd,
        &["gates", "--config", &config, "--repository", "", "--json"],
        0,
    );
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v[0]["action"], "push_badges");
    assert_eq!(v[0]["verdict"], "run");
}
