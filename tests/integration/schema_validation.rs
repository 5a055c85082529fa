use jsonschema::validator_for;

fn read_schema(name: &str) -> serde_json::Value {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir.join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  serde_json::from_slice(&data).expect("valid schema JSON")
}

fn compile_schema(name: &str) -> jsonschema::Validator {
  let schema = read_schema(name);
  validator_for(&schema).expect("compile schema")
}

#[test]
fn flat_report_conforms_to_schema() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  let out = cmd
    .args([
      "--input",
      &test_support::fixture_path("flat_batch.json"),
      "--status-catalog",
      &test_support::fixture_path("status_catalog.json"),
      "--aggregate-by",
      "both",
      "--timezone",
      "UTC",
      "--now",
      "2024-01-08T12:00:00Z",
    ])
    .output()
    .unwrap();
  assert!(out.status.success());
  let v = test_support::stdout_json(&out);

  let compiled = compile_schema("status-time-report.report.schema.json");
  compiled.validate(&v).expect("schema validation failed for flat report");
}

#[test]
fn jira_report_conforms_to_schema() {
  let mut cmd = test_support::cmd_bin("status-time-report");
  let out = cmd
    .args([
      "--input",
      &test_support::fixture_path("jira_batch.json"),
      "--input-format",
      "jira",
      "--now",
      "2024-03-15T00:00:00Z",
    ])
    .output()
    .unwrap();
  assert!(out.status.success());
  let v = test_support::stdout_json(&out);

  let compiled = compile_schema("status-time-report.report.schema.json");
  compiled.validate(&v).expect("schema validation failed for jira report");
}

#[test]
fn split_manifest_conforms_to_schema() {
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
  assert!(out.status.success());
  let top = test_support::stdout_json(&out);
  let dir = std::path::Path::new(top["dir"].as_str().unwrap());
  let manifest: serde_json::Value =
    serde_json::from_slice(&std::fs::read(dir.join(top["manifest"].as_str().unwrap())).unwrap()).unwrap();

  let compiled = compile_schema("status-time-report.manifest.schema.json");
  compiled.validate(&manifest).expect("schema validation failed for manifest");
}
