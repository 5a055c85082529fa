// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate a report run: load + filter input, fan out per-issue computation on a bounded pool, roll up, assemble, save
// role: processing/orchestrator
// inputs: EffectiveConfig, RunParams (validated calendar, catalog, now, jobs)
// outputs: Report JSON on stdout or --out; with --split-apart, per-table files + manifest.json and a {dir, manifest} pointer on stdout
// side_effects: Reads input; creates directories; writes JSON files; prints to stdout; logs data-quality signals to stderr
// invariants:
// - the calendar is validated before any input is read
// - `now` is resolved once per run and shared by every issue
// - split ⇒ pointer {dir, manifest} printed; non-split ⇒ JSON printed or written to --out
// errors: Propagates load/pool/save/write errors with file path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::aggregate::{ProcessContext, aggregate};
use crate::cli::EffectiveConfig;
use crate::ingest::{Batch, load_batch, select_issues};
use crate::manifest::{MANIFEST_FILE, write_split_report};
use crate::model::{Report, ReportSummary};
use crate::params::{RunParams, build_run_params};
use crate::report::{AssembleOptions, assemble, status_columns};
use crate::rollup::rollup;
use crate::util;

/// Compute the full report for an already-loaded batch.
pub fn generate_report(params: &RunParams, batch: Batch) -> Result<Report> {
  let Batch { issues, events, dropped_events } = batch;
  if dropped_events > 0 {
    warn!(dropped_events, "status changes with unparseable timestamps were ignored");
  }

  let total = issues.len();
  let issues = select_issues(issues, &params.filter, params.now);
  if issues.len() < total {
    info!(kept = issues.len(), excluded = total - issues.len(), "issue filters applied");
  }

  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(params.jobs)
    .build()
    .context("building worker pool")?;
  let ctx = ProcessContext { calendar: &params.calendar, catalog: &params.catalog, now: params.now };
  let aggregation = pool.install(|| aggregate(&issues, &events, &ctx));
  debug!(issues = issues.len(), threads = pool.current_num_threads(), "per-issue timelines computed");

  for m in aggregation.per_issue.iter().filter(|m| m.dropped_segments > 0) {
    debug!(issue = %m.issue_key, dropped = m.dropped_segments, "degenerate status segments dropped");
  }

  let (parents, epics) = rollup(&issues, &aggregation.per_issue);
  let opts = AssembleOptions { catalog: &params.catalog, aggregate_by: params.aggregate_by };
  let tables = assemble(&issues, &aggregation, &parents, &epics, &opts);

  let now = util::iso_utc(params.now);
  let summary = ReportSummary {
    generated_at: now.clone(),
    now,
    timezone: params.calendar.timezone_name().to_string(),
    business_start: params.calendar.business_start(),
    business_end: params.calendar.business_end(),
    business_days: params.calendar.business_days(),
    issue_count: issues.len(),
    interval_count: aggregation.interval_count(),
    dropped_events,
    dropped_segments: aggregation.dropped_segments(),
    status_columns: status_columns(&aggregation),
  };
  info!(
    issues = summary.issue_count,
    intervals = summary.interval_count,
    parents = parents.len(),
    epics = epics.len(),
    "report assembled"
  );

  Ok(Report { summary, tables })
}

/// Persist `report` per the output flags. Returns the JSON to print on stdout, if any.
pub fn save_report(cfg: &EffectiveConfig, params: &RunParams, report: &Report) -> Result<Option<serde_json::Value>> {
  if cfg.split_apart {
    let base_dir = util::prepare_out_dir(&cfg.out, Some(params.now))?;
    write_split_report(&base_dir, &report.summary, &report.tables, params.now)?;
    info!(dir = %base_dir, "split report written");
    return Ok(Some(serde_json::json!({"dir": base_dir, "manifest": MANIFEST_FILE})));
  }

  if cfg.out == "-" {
    return Ok(Some(serde_json::to_value(report)?));
  }

  let out_path = std::path::Path::new(&cfg.out);
  if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(out_path, serde_json::to_vec_pretty(report)?)
    .with_context(|| format!("writing report {}", out_path.display()))?;
  info!(file = %out_path.display(), "report written");
  Ok(None)
}

pub fn process(cfg: &EffectiveConfig) -> Result<()> {
  // Phase 1: validate configuration before touching the input
  let params = build_run_params(cfg)?;
  debug!(config = ?cfg, "effective configuration");

  // Phase 2: load and compute
  let batch = load_batch(&cfg.input, cfg.input_format)?;
  let report = generate_report(&params, batch)?;

  // Phase 3: save or print
  if let Some(v) = save_report(cfg, &params, &report)? {
    println!("{}", serde_json::to_string_pretty(&v)?);
  }
  Ok(())
}
