use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn studysync(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("studysync").unwrap();
    cmd.env("STUDYSYNC_HOME", home.path())
        .env_remove("STUDYSYNC_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    studysync(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("queue"))
        .stdout(predicate::str::contains("progress"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn test_offline_queue_syncs_when_back_online() {
    let home = TempDir::new().unwrap();

    studysync(&home)
        .args(["network", "offline"])
        .assert()
        .success()
        .stderr(predicate::str::contains("You are offline"));

    studysync(&home)
        .args(["queue", "add", "create", "comment", r#"{"body":"Great lesson"}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("Change saved. Will sync when online."));

    studysync(&home)
        .args(["queue", "status", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pending\": 1"))
        .stdout(predicate::str::contains("\"online\": false"));

    studysync(&home)
        .args(["network", "online", "--connection", "wifi"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Back online! Syncing changes..."))
        .stderr(predicate::str::contains("Synced 1 change(s)"));

    studysync(&home)
        .args(["queue", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));

    let outbox = std::fs::read_to_string(home.path().join("outbox.jsonl")).unwrap();
    assert_eq!(outbox.lines().count(), 1);
    assert!(outbox.contains("\"entity\":\"comment\""));
    assert!(outbox.contains("\"type\":\"create\""));
}

#[test]
fn test_queue_sync_offline_keeps_backlog() {
    let home = TempDir::new().unwrap();
    studysync(&home).args(["network", "offline"]).assert().success();
    studysync(&home)
        .args(["queue", "add", "delete", "comment", r#"{"id":7}"#])
        .assert()
        .success();

    studysync(&home)
        .args(["queue", "sync", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\": \"offline\""));

    studysync(&home)
        .args(["queue", "status", "-o", "json"])
        .assert()
        .stdout(predicate::str::contains("\"pending\": 1"));
}

#[test]
fn test_invalid_mutation_type_exits_with_usage_code() {
    let home = TempDir::new().unwrap();
    studysync(&home)
        .args(["queue", "add", "upsert", "comment"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown mutation type"));
}

#[test]
fn test_progress_flow() {
    let home = TempDir::new().unwrap();

    studysync(&home)
        .args(["progress", "init", "alice", "rust-101", "intro", "ownership"])
        .assert()
        .success();

    studysync(&home)
        .args(["progress", "complete", "alice", "rust-101", "intro", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"completionPercentage\": 50"));

    // Enrolling again keeps what was already done.
    studysync(&home)
        .args(["progress", "init", "alice", "rust-101", "intro", "ownership", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"completionPercentage\": 50"));

    studysync(&home)
        .args(["progress", "watch", "alice", "rust-101", "ownership", "90", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalTimeSpent\": 90"));

    studysync(&home)
        .args(["progress", "achievements", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Halfway There"));
}

#[test]
fn test_progress_unknown_course_exits_not_found() {
    let home = TempDir::new().unwrap();
    studysync(&home)
        .args(["progress", "show", "bob", "nope"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not enrolled"));
}

#[test]
fn test_session_credits_watch_time() {
    let home = TempDir::new().unwrap();
    studysync(&home)
        .args(["progress", "init", "alice", "rust-101", "intro"])
        .assert()
        .success();

    studysync(&home)
        .args(["session", "alice", "rust-101", "intro", "2s", "--interval", "1", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"credited_seconds\": 2"));
}

#[test]
fn test_config_default_output_json() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "general:\n  default_output: json\n",
    )
    .unwrap();

    studysync(&home)
        .args(["queue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));
}
