use serde_json::Value;

fn read_json(path: &std::path::Path) -> Value {
  serde_json::from_slice(&std::fs::read(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))).unwrap()
}

#[test]
fn split_apart_writes_tables_summary_and_manifest() {
  let outdir = test_support::tempdir();
  let out_path = outdir.path().to_str().unwrap();
  let mut cmd = test_support::cmd_bin("status-time-report");
  let out = cmd
    .args([
      "--split-apart",
      "--input",
      &test_support::fixture_path("flat_batch.json"),
      "--timezone",
      "UTC",
      "--now",
      "2024-01-08T12:00:00Z",
      "--out",
      out_path,
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let top = test_support::stdout_json(&out);
  assert_eq!(top["manifest"], "manifest.json");
  let dir = std::path::PathBuf::from(top["dir"].as_str().unwrap());
  assert_eq!(dir, outdir.path().canonicalize().unwrap());

  let manifest = read_json(&dir.join("manifest.json"));
  assert_eq!(manifest["generated_at"], "2024-01-08T12:00:00Z");
  let files = manifest["files"].as_array().unwrap();
  let listed: Vec<(&str, u64)> =
    files.iter().map(|f| (f["table"].as_str().unwrap(), f["rows"].as_u64().unwrap())).collect();
  assert_eq!(listed, vec![("issues", 4), ("transitions", 7), ("rollups", 2), ("status_stats", 6)]);

  for f in files {
    let rows = read_json(&dir.join(f["file"].as_str().unwrap()));
    assert_eq!(rows.as_array().unwrap().len() as u64, f["rows"].as_u64().unwrap());
  }

  let summary = read_json(&dir.join("summary.json"));
  assert_eq!(summary["issue_count"], 4);
  assert_eq!(summary["interval_count"], 7);
}

#[test]
fn split_apart_to_dash_creates_stamped_temp_dir() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  let out = cmd
    .args([
      "--split-apart",
      "--input",
      &test_support::fixture_path("flat_batch.json"),
      "--timezone",
      "UTC",
      "--now",
      "2024-01-08T12:00:00Z",
    ])
    .output()
    .unwrap();
  assert!(out.status.success());

  let top = test_support::stdout_json(&out);
  let dir = std::path::PathBuf::from(top["dir"].as_str().unwrap());
  let name = dir.file_name().unwrap().to_string_lossy().to_string();
  assert_eq!(name, "status-time-20240108-120000");
  assert!(dir.join("manifest.json").exists());
  std::fs::remove_dir_all(&dir).ok();
}
