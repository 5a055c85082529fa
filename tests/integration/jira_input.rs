use serde_json::Value;

fn run_jira() -> Value {
  let export = test_support::fixture_path("jira_batch.json");
  let mut cmd = test_support::cmd_bin("status-time-report");
  let out = cmd
    .args(["--input", &export, "--input-format", "jira", "--now", "2024-03-15T00:00:00Z"])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  test_support::stdout_json(&out)
}

#[test]
fn jira_export_uses_default_new_york_calendar_across_dst() {
  let v = run_jira();
  assert_eq!(v["summary"]["timezone"], "America/New_York");
  assert_eq!(v["summary"]["issue_count"], 2);
  assert_eq!(v["summary"]["interval_count"], 3);
  assert_eq!(v["summary"]["dropped_events"], 0);

  let ops7: Vec<&Value> =
    v["transitions"].as_array().unwrap().iter().filter(|t| t["issue_key"] == "OPS-7").collect();
  assert_eq!(ops7.len(), 1);
  assert_eq!(ops7[0]["status_name"], "In Progress");
  assert_eq!(ops7[0]["entered_at"], "2024-03-08T14:00:00Z");
  assert_eq!(ops7[0]["exited_at"], "2024-03-11T21:00:00Z");
  // Fri 09:00 EST .. Mon 17:00 EDT: the spring-forward weekend shortens wall time only
  assert_eq!(ops7[0]["duration_seconds_wall"], 284_400);
  assert_eq!(ops7[0]["duration_seconds_business"], 57_600);
}

#[test]
fn jira_fields_map_onto_issue_rows() {
  let v = run_jira();
  let issues = v["issues"].as_array().unwrap();
  let ops7 = &issues[0];
  assert_eq!(ops7["issue_key"], "OPS-7");
  assert_eq!(ops7["project_key"], "OPS");
  assert_eq!(ops7["issue_type"], "Task");
  assert_eq!(ops7["status_current"], "Done");
  assert_eq!(ops7["created"], "2024-03-08T14:00:00Z");
  assert_eq!(ops7["parent_key"], "OPS-1");
  assert_eq!(ops7["epic_key"], "OPS-100");
  assert_eq!(ops7["labels"], "infra");
  assert_eq!(ops7["dropped_segments"], 2);

  let ops8 = &issues[1];
  assert_eq!(ops8["epic_key"], "");
  assert_eq!(ops8["total_status_entries"], 2);
}

#[test]
fn top_level_changelogs_are_merged_by_issue_key() {
  let v = run_jira();
  let ops8: Vec<&Value> =
    v["transitions"].as_array().unwrap().iter().filter(|t| t["issue_key"] == "OPS-8").collect();
  let statuses: Vec<&str> = ops8.iter().map(|t| t["status_name"].as_str().unwrap()).collect();
  assert_eq!(statuses, vec!["To Do", "In Progress"]);
  assert!(ops8.iter().all(|t| t["duration_seconds_business"] == 3600));
}

#[test]
fn jira_rollups() {
  let v = run_jira();
  let rollups = v["rollups"].as_array().unwrap();
  assert_eq!(rollups.len(), 2);
  assert_eq!(rollups[0]["level"], "parent");
  assert_eq!(rollups[0]["entity_key"], "OPS-1");
  assert_eq!(rollups[0]["children_count"], 2);
  assert_eq!(rollups[0]["total_time_wall_hours"], 81.0);
  assert_eq!(rollups[0]["total_time_business_hours"], 18.0);
  assert_eq!(rollups[0]["epic_key"], "");
  assert_eq!(rollups[1]["level"], "epic");
  assert_eq!(rollups[1]["entity_key"], "OPS-100");
  assert_eq!(rollups[1]["children_count"], 1);
  assert_eq!(rollups[1]["total_time_business_hours"], 16.0);
}
