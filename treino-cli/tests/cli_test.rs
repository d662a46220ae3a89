use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn treino(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("treino").unwrap();
    cmd.env_remove("TREINO_API_URL")
        .env_remove("TREINO_CONFIG")
        .arg("--config")
        .arg(dir.path().join("config.toml"));
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("treino").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Terminal client for the Treino coaching API"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("my-programs"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("treino").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let mut cmd = Command::cargo_bin("treino").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_treino"));
}

#[test]
fn test_whoami_without_session() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are not logged in."));
}

#[test]
fn test_protected_command_without_session_fails() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .args(["athletes", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_ids_must_be_uuids() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .args(["programs", "show", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_login_checks_input_before_calling_the_api() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .args(["--api-url", "http://127.0.0.1:1"])
        .args(["login", "--email", "not-an-email", "--password", "secret123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email: Invalid email address"));
}

#[test]
fn test_program_update_needs_a_change() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .args(["programs", "update", "8a4c5a8e-5b0f-4c43-9f5e-6d1f1c0b7a11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}

#[test]
fn test_blank_program_title_is_rejected_locally() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .args(["--api-url", "http://127.0.0.1:1"])
        .args(["programs", "create", "--athlete", "8a4c5a8e-5b0f-4c43-9f5e-6d1f1c0b7a11"])
        .args(["--title", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title: Title must be between 1 and 200 characters"));
}

#[test]
fn test_workout_dates_must_be_calendar_dates() {
    let dir = TempDir::new().unwrap();

    treino(&dir)
        .args(["workouts", "add", "8a4c5a8e-5b0f-4c43-9f5e-6d1f1c0b7a11"])
        .args(["--date", "2025-02-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_set_exercises_checks_the_file_before_sending() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("exercises.json");
    std::fs::write(
        &file,
        r#"[{ "exerciseId": "8a4c5a8e-5b0f-4c43-9f5e-6d1f1c0b7a11", "order": -1 }]"#,
    )
    .unwrap();

    treino(&dir)
        .args(["--api-url", "http://127.0.0.1:1"])
        .args([
            "workouts",
            "set-exercises",
            "8a4c5a8e-5b0f-4c43-9f5e-6d1f1c0b7a11",
            "9b5d6b9f-6c1a-4d54-8a6f-7e2a2d1c8b22",
            "--file",
        ])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exercises[0].order"));
}
