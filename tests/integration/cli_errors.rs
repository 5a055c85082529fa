use predicates::prelude::*;

fn flat_cmd() -> assert_cmd::Command {
  let mut cmd = test_support::cmd_bin("status-time-report");
  cmd.args(["--input", &test_support::fixture_path("flat_batch.json"), "--now", "2024-01-08T12:00:00Z"]);
  cmd
}

#[test]
fn inverted_business_hours_fail_before_reading_input() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  cmd
    .args(["--input", "/definitely/not/here.json", "--business-start", "18:00", "--business-end", "09:00"])
    .assert()
    .failure()
    .stdout("")
    .stderr(predicate::str::contains("invalid business calendar"));
}

#[test]
fn unknown_timezone_from_env_fails() {
  let mut cmd = flat_cmd();
  cmd
    .env("TIMEZONE", "Mars/Olympus")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid business calendar"))
    .stderr(predicate::str::contains("Mars/Olympus"));
}

#[test]
fn bad_business_day_name_fails() {
  let mut cmd = flat_cmd();
  cmd
    .args(["--business-days", "Mon,Funday"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Funday"));
}

#[test]
fn missing_input_file_names_path() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  cmd
    .args(["--input", "/definitely/not/here.json", "--timezone", "UTC"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("/definitely/not/here.json"));
}

#[test]
fn zero_window_is_rejected() {
  let mut cmd = flat_cmd();
  cmd.args(["--window-days", "0"]).assert().failure().stderr(predicate::str::contains("--window-days"));
}

#[test]
fn unparseable_now_is_rejected() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  cmd
    .args(["--input", &test_support::fixture_path("flat_batch.json"), "--now", "next tuesday"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("next tuesday"));
}

#[test]
fn non_object_input_is_rejected() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  cmd
    .args(["--timezone", "UTC"])
    .write_stdin("[1, 2, 3]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("issues"));
}
