// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Write the per-table files of a split-apart run and the manifest.json that indexes them
// role: persistence/manifest
// inputs: base_dir, ReportTables, ReportSummary, generated_at
// outputs: <table>.json files and manifest.json under base_dir
// side_effects: Writes to filesystem
// invariants:
// - manifest files[] lists tables in fixed order: issues, transitions, rollups, status_stats
// - file paths in entries are relative to base_dir
// - generated_at is RFC3339 UTC
// errors: IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{ReportSummary, ReportTables};
use crate::util::iso_utc;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
  pub table: String,
  pub file: String,
  pub rows: usize,
}

/// Helper to build and write the manifest of a split-apart run.
#[derive(Debug, Serialize)]
pub struct Manifest {
  generated_at: String,
  files: Vec<TableEntry>,
}

impl Manifest {
  pub fn new(generated_at: DateTime<Utc>) -> Self {
    Self { generated_at: iso_utc(generated_at), files: Vec::new() }
  }

  pub fn push(&mut self, table: &str, file: &str, rows: usize) {
    self.files.push(TableEntry { table: table.into(), file: file.into(), rows });
  }

  pub fn write_to(&self, base_dir: &str) -> Result<PathBuf> {
    write_json(&Path::new(base_dir).join(MANIFEST_FILE), self)
  }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
  let buf = serde_json::to_vec_pretty(value)?;
  std::fs::write(path, buf).with_context(|| format!("writing {}", path.display()))?;
  Ok(path.to_path_buf())
}

fn write_table<T: Serialize>(base_dir: &str, manifest: &mut Manifest, table: &str, rows: &[T]) -> Result<()> {
  let file = format!("{}.json", table);
  write_json(&Path::new(base_dir).join(&file), rows)?;
  manifest.push(table, &file, rows.len());
  Ok(())
}

/// Write summary.json, one file per table, then manifest.json. Returns the manifest path.
pub fn write_split_report(
  base_dir: &str,
  summary: &ReportSummary,
  tables: &ReportTables,
  generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
  write_json(&Path::new(base_dir).join(SUMMARY_FILE), summary)?;

  let mut manifest = Manifest::new(generated_at);
  write_table(base_dir, &mut manifest, "issues", &tables.issues)?;
  write_table(base_dir, &mut manifest, "transitions", &tables.transitions)?;
  write_table(base_dir, &mut manifest, "rollups", &tables.rollups)?;
  write_table(base_dir, &mut manifest, "status_stats", &tables.status_stats)?;
  manifest.write_to(base_dir)
}
