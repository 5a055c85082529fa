use status_time_report::model::TransitionRow;

#[test]
fn ops1_transitions_snapshot() {
  test_support::init_tracing();
  test_support::init_insta();
  let mut cmd = test_support::cmd_bin("status-time-report");
  let out = cmd
    .args([
      "--input",
      &test_support::fixture_path("flat_batch.json"),
      "--status-catalog",
      &test_support::fixture_path("status_catalog.json"),
      "--timezone",
      "UTC",
      "--now",
      "2024-01-08T12:00:00Z",
    ])
    .output()
    .unwrap();
  assert!(out.status.success());

  let v = test_support::stdout_json(&out);
  let rows: Vec<TransitionRow> = serde_json::from_value(v["transitions"].clone()).unwrap();
  let ops1: Vec<TransitionRow> = rows.into_iter().filter(|r| r.issue_key == "OPS-1").collect();

  insta::assert_json_snapshot!(ops1, @r###"
  [
    {
      "issue_key": "OPS-1",
      "status_name": "In Progress",
      "status_category": "In Progress",
      "entered_at": "2024-01-01T09:00:00Z",
      "exited_at": "2024-01-02T09:00:00Z",
      "duration_seconds_business": 28800,
      "duration_seconds_wall": 86400,
      "interval_index": 0
    },
    {
      "issue_key": "OPS-1",
      "status_name": "Review",
      "status_category": "In Progress",
      "entered_at": "2024-01-02T09:00:00Z",
      "exited_at": "2024-01-02T13:00:00Z",
      "duration_seconds_business": 14400,
      "duration_seconds_wall": 14400,
      "interval_index": 1
    },
    {
      "issue_key": "OPS-1",
      "status_name": "In Progress",
      "status_category": "In Progress",
      "entered_at": "2024-01-02T13:00:00Z",
      "exited_at": "2024-01-03T12:00:00Z",
      "duration_seconds_business": 25200,
      "duration_seconds_wall": 82800,
      "interval_index": 2
    }
  ]
  "###);
}
