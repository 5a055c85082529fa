// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the in-memory model (issues, transition events, status intervals, summaries, rollup buckets) shared by the engine and the report tables
// role: model/types
// inputs: Decoded tracker records (see ingest)
// outputs: Plain structs; derived entities are rebuilt for every run and never persisted on their own
// invariants:
// - StatusInterval.exited_at > entered_at strictly
// - StatusSummary.entered_count counts intervals, not distinct statuses
// - All instants are UTC; calendar-local conversion happens only inside calendar
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracker issue as handed over by the ingest layer. Read-only for the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
  pub key: String,
  pub project_key: String,
  pub issue_type: String,
  pub summary: String,
  /// Current status; empty when the tracker did not report one.
  pub status: String,
  pub created: Option<DateTime<Utc>>,
  pub updated: Option<DateTime<Utc>>,
  pub parent_key: Option<String>,
  pub epic_key: Option<String>,
  pub labels: BTreeSet<String>,
}

/// A single status-field change from an issue's history.
///
/// `at` is `None` when the source timestamp was missing or unparseable; such
/// events are skipped when the timeline is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
  pub issue_key: String,
  pub at: Option<DateTime<Utc>>,
  pub from_status: Option<String>,
  pub to_status: String,
}

/// "The issue sat in `status` from `entered_at` until `exited_at`", before measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSegment {
  pub status: String,
  pub entered_at: DateTime<Utc>,
  pub exited_at: DateTime<Utc>,
  /// True when `exited_at` is the evaluation instant rather than a recorded time.
  pub open: bool,
}

/// A measured timeline segment, as exported in the transitions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusInterval {
  pub issue_key: String,
  pub status_name: String,
  pub status_category: String,
  pub entered_at: DateTime<Utc>,
  pub exited_at: DateTime<Utc>,
  pub open: bool,
  pub duration_seconds_wall: i64,
  pub duration_seconds_business: i64,
  /// Position within the issue's own timeline, starting at 0.
  pub interval_index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
  pub entered_count: u32,
  pub wall_seconds: i64,
  pub business_seconds: i64,
}

impl StatusSummary {
  pub fn record(&mut self, interval: &StatusInterval) {
    self.entered_count += 1;
    self.wall_seconds += interval.duration_seconds_wall;
    self.business_seconds += interval.duration_seconds_business;
  }

  pub fn absorb(&mut self, other: &StatusSummary) {
    self.entered_count += other.entered_count;
    self.wall_seconds += other.wall_seconds;
    self.business_seconds += other.business_seconds;
  }
}

/// Per-status totals for one issue, keyed by status name (sorted for stable output).
pub type StatusSummaries = BTreeMap<String, StatusSummary>;

/// Sum every status bucket of one issue into a single total.
pub fn total_of(summaries: &StatusSummaries) -> StatusSummary {
  summaries.values().fold(StatusSummary::default(), |mut acc, s| {
    acc.absorb(s);
    acc
  })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollupLevel {
  Parent,
  Epic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupBucket {
  pub entity_key: String,
  pub level: RollupLevel,
  pub child_issue_count: usize,
  pub wall_seconds: i64,
  pub business_seconds: i64,
  pub entered_count: u32,
  /// Parent buckets only: epic of the most recently seen contributing child.
  pub epic_key: Option<String>,
}

// --- Report tables (row shapes handed to the table writer) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummaryRow {
  pub issue_key: String,
  pub project_key: String,
  pub issue_type: String,
  pub summary: String,
  pub status_current: String,
  pub created: String,
  pub updated: String,
  pub epic_key: String,
  pub parent_key: String,
  pub labels: String,
  pub total_time_open_wall_hours: f64,
  pub total_time_open_business_hours: f64,
  pub total_status_entries: u32,
  pub dropped_segments: usize,
  /// `entries_<status>` columns, one per reported status column.
  #[serde(flatten)]
  pub status_entries: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRow {
  pub issue_key: String,
  pub status_name: String,
  pub status_category: String,
  pub entered_at: String,
  pub exited_at: String,
  pub duration_seconds_business: i64,
  pub duration_seconds_wall: i64,
  pub interval_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupRow {
  pub level: RollupLevel,
  pub entity_key: String,
  pub epic_key: String,
  pub parent_key: String,
  pub children_count: usize,
  pub total_time_wall_hours: f64,
  pub total_time_business_hours: f64,
  pub total_status_entries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusStatRow {
  pub issue_key: String,
  pub project_key: String,
  pub issue_type: String,
  pub parent_key: String,
  pub epic_key: String,
  pub bucket: String,
  pub status: String,
  pub entered_count: u32,
  pub wall_hours: f64,
  pub business_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
  pub generated_at: String,
  pub now: String,
  pub timezone: String,
  pub business_start: String,
  pub business_end: String,
  pub business_days: Vec<String>,
  pub issue_count: usize,
  pub interval_count: usize,
  pub dropped_events: usize,
  pub dropped_segments: usize,
  pub status_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTables {
  pub issues: Vec<IssueSummaryRow>,
  pub transitions: Vec<TransitionRow>,
  pub rollups: Vec<RollupRow>,
  pub status_stats: Vec<StatusStatRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub summary: ReportSummary,
  #[serde(flatten)]
  pub tables: ReportTables,
}
