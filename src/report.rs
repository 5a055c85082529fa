// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shape aggregated metrics into the exported row sets (issues, transitions, rollups, status_stats)
// role: report/assemble
// inputs: &[Issue], Aggregation (per-issue metrics aligned with issues), parent/epic RollupBuckets, StatusCatalog, AggregateBy
// outputs: ReportTables (row vectors), status column list; no I/O
// invariants:
// - hours = seconds / 3600 rounded half away from zero (2 decimals for issue/rollup tables, 3 for status_stats)
// - status columns are the first STATUS_COLUMN_LIMIT distinct status names in sorted order
// - parent rollup rows precede epic rollup rows
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregation, IssueMetrics};
use crate::catalog::StatusCatalog;
use crate::model::{
  Issue, IssueSummaryRow, ReportTables, RollupBucket, RollupLevel, RollupRow, StatusInterval, StatusStatRow,
  StatusSummaries, StatusSummary, TransitionRow,
};
use crate::util::iso_utc;

pub const STATUS_COLUMN_LIMIT: usize = 20;
pub const ENTRIES_PREFIX: &str = "entries_";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateBy {
  /// One status_stats row per status name
  #[default]
  Name,
  /// Status-name rows plus rows grouped by status category
  Both,
}

/// Round `seconds / 3600` to `decimals` places, half away from zero.
pub fn round_hours(seconds: i64, decimals: u32) -> f64 {
  let scale = 10i128.pow(decimals);
  let num = seconds as i128 * scale;
  let q = (num.abs() + 1800) / 3600;
  let q = if num < 0 { -q } else { q };
  q as f64 / scale as f64
}

fn ts_or_empty(ts: Option<DateTime<Utc>>) -> String {
  ts.map(iso_utc).unwrap_or_default()
}

/// Distinct status names entered by any issue of the batch, sorted, capped.
pub fn status_columns(aggregation: &Aggregation) -> Vec<String> {
  let all: BTreeSet<&str> =
    aggregation.per_issue.iter().flat_map(|m| m.summaries.keys().map(String::as_str)).collect();
  all.into_iter().take(STATUS_COLUMN_LIMIT).map(String::from).collect()
}

pub struct AssembleOptions<'a> {
  pub catalog: &'a StatusCatalog,
  pub aggregate_by: AggregateBy,
}

pub fn assemble(
  issues: &[Issue],
  aggregation: &Aggregation,
  parents: &[RollupBucket],
  epics: &[RollupBucket],
  opts: &AssembleOptions,
) -> ReportTables {
  let columns = status_columns(aggregation);
  let empty = IssueMetrics {
    issue_key: String::new(),
    summaries: StatusSummaries::new(),
    intervals: Vec::new(),
    dropped_segments: 0,
  };

  let mut tables = ReportTables::default();
  for (i, issue) in issues.iter().enumerate() {
    let metrics = aggregation.per_issue.get(i).filter(|m| m.issue_key == issue.key).unwrap_or(&empty);
    tables.issues.push(issue_row(issue, metrics, &columns));
    tables.status_stats.extend(status_stat_rows(issue, &metrics.summaries, opts));
  }
  tables.transitions = aggregation.intervals().map(transition_row).collect();
  tables.rollups = parents.iter().chain(epics.iter()).map(rollup_row).collect();
  tables
}

fn issue_row(issue: &Issue, metrics: &IssueMetrics, columns: &[String]) -> IssueSummaryRow {
  let total = metrics.total();
  let bounces = metrics.bounce_counts();
  let status_entries = columns
    .iter()
    .map(|s| (format!("{}{}", ENTRIES_PREFIX, s), bounces.get(s).copied().unwrap_or(0)))
    .collect();

  IssueSummaryRow {
    issue_key: issue.key.clone(),
    project_key: issue.project_key.clone(),
    issue_type: issue.issue_type.clone(),
    summary: issue.summary.clone(),
    status_current: issue.status.clone(),
    created: ts_or_empty(issue.created),
    updated: ts_or_empty(issue.updated),
    epic_key: issue.epic_key.clone().unwrap_or_default(),
    parent_key: issue.parent_key.clone().unwrap_or_default(),
    labels: issue.labels.iter().map(String::as_str).collect::<Vec<_>>().join(";"),
    total_time_open_wall_hours: round_hours(total.wall_seconds, 2),
    total_time_open_business_hours: round_hours(total.business_seconds, 2),
    total_status_entries: total.entered_count,
    dropped_segments: metrics.dropped_segments,
    status_entries,
  }
}

fn transition_row(iv: &StatusInterval) -> TransitionRow {
  TransitionRow {
    issue_key: iv.issue_key.clone(),
    status_name: iv.status_name.clone(),
    status_category: iv.status_category.clone(),
    entered_at: iso_utc(iv.entered_at),
    // open intervals were measured up to `now` but have not been exited
    exited_at: if iv.open { String::new() } else { iso_utc(iv.exited_at) },
    duration_seconds_business: iv.duration_seconds_business,
    duration_seconds_wall: iv.duration_seconds_wall,
    interval_index: iv.interval_index,
  }
}

fn rollup_row(b: &RollupBucket) -> RollupRow {
  let (epic_key, parent_key) = match b.level {
    RollupLevel::Parent => (b.epic_key.clone().unwrap_or_default(), b.entity_key.clone()),
    RollupLevel::Epic => (b.entity_key.clone(), String::new()),
  };
  RollupRow {
    level: b.level,
    entity_key: b.entity_key.clone(),
    epic_key,
    parent_key,
    children_count: b.child_issue_count,
    total_time_wall_hours: round_hours(b.wall_seconds, 2),
    total_time_business_hours: round_hours(b.business_seconds, 2),
    total_status_entries: b.entered_count,
  }
}

fn status_stat_rows(issue: &Issue, summaries: &StatusSummaries, opts: &AssembleOptions) -> Vec<StatusStatRow> {
  let mut rows: Vec<StatusStatRow> =
    summaries.iter().map(|(name, s)| stat_row(issue, "name", name, s)).collect();

  if opts.aggregate_by == AggregateBy::Both {
    let mut by_category: BTreeMap<&str, StatusSummary> = BTreeMap::new();
    for (name, s) in summaries {
      let cat = match opts.catalog.category(name) {
        "" => name.as_str(),
        c => c,
      };
      by_category.entry(cat).or_default().absorb(s);
    }
    rows.extend(by_category.iter().map(|(cat, s)| stat_row(issue, "category", cat, s)));
  }
  rows
}

fn stat_row(issue: &Issue, bucket: &str, status: &str, s: &StatusSummary) -> StatusStatRow {
  StatusStatRow {
    issue_key: issue.key.clone(),
    project_key: issue.project_key.clone(),
    issue_type: issue.issue_type.clone(),
    parent_key: issue.parent_key.clone().unwrap_or_default(),
    epic_key: issue.epic_key.clone().unwrap_or_default(),
    bucket: bucket.to_string(),
    status: status.to_string(),
    entered_count: s.entered_count,
    wall_hours: round_hours(s.wall_seconds, 3),
    business_hours: round_hours(s.business_seconds, 3),
  }
}
