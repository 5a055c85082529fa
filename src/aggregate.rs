// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive timeline + summarization across a batch of issues (scatter/gather over rayon) and keep the flattened interval list
// role: engine/aggregate
// inputs: &[Issue], &[TransitionEvent], ProcessContext (calendar, catalog, now)
// outputs: Aggregation with one IssueMetrics per input issue, in input order
// side_effects: None; inputs are borrowed immutably. Runs on the current rayon pool (callers bound it via ThreadPool::install)
// invariants:
// - per_issue[i] belongs to issues[i] regardless of scheduling (indexed collect)
// - identical inputs and `now` => identical output
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::calendar::BusinessCalendar;
use crate::catalog::StatusCatalog;
use crate::model::{Issue, StatusInterval, StatusSummaries, StatusSummary, TransitionEvent, total_of};
use crate::summarize::{measure, summarize_intervals};
use crate::timeline::build_timeline;

pub struct ProcessContext<'a> {
  pub calendar: &'a BusinessCalendar,
  pub catalog: &'a StatusCatalog,
  pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueMetrics {
  pub issue_key: String,
  pub summaries: StatusSummaries,
  pub intervals: Vec<StatusInterval>,
  pub dropped_segments: usize,
}

impl IssueMetrics {
  /// Times each status was entered (a count above one means the issue bounced back).
  pub fn bounce_counts(&self) -> BTreeMap<String, u32> {
    self.summaries.iter().map(|(k, v)| (k.clone(), v.entered_count)).collect()
  }

  pub fn total(&self) -> StatusSummary {
    total_of(&self.summaries)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
  pub per_issue: Vec<IssueMetrics>,
}

impl Aggregation {
  /// All intervals of the batch, issue by issue, each issue's in timeline order.
  pub fn intervals(&self) -> impl Iterator<Item = &StatusInterval> {
    self.per_issue.iter().flat_map(|m| m.intervals.iter())
  }

  pub fn interval_count(&self) -> usize {
    self.per_issue.iter().map(|m| m.intervals.len()).sum()
  }

  pub fn dropped_segments(&self) -> usize {
    self.per_issue.iter().map(|m| m.dropped_segments).sum()
  }
}

/// Compute timeline, intervals and per-status totals for a single issue.
pub fn process_issue(issue: &Issue, events: &[&TransitionEvent], ctx: &ProcessContext) -> IssueMetrics {
  let timeline = build_timeline(issue, events.iter().copied(), ctx.now);
  let intervals = measure(&issue.key, &timeline.segments, ctx.calendar, ctx.catalog);
  let summaries = summarize_intervals(&intervals);

  IssueMetrics {
    issue_key: issue.key.clone(),
    summaries,
    intervals,
    dropped_segments: timeline.dropped,
  }
}

/// Process every issue of the batch; per-issue work fans out over the current rayon pool.
pub fn aggregate(issues: &[Issue], events: &[TransitionEvent], ctx: &ProcessContext) -> Aggregation {
  // Phase 1: group events by issue key, keeping record order inside each group
  let mut by_issue: HashMap<&str, Vec<&TransitionEvent>> = HashMap::new();
  for e in events {
    by_issue.entry(e.issue_key.as_str()).or_default().push(e);
  }

  // Phase 2: scatter; collect() on an indexed iterator preserves input order
  let empty: Vec<&TransitionEvent> = Vec::new();
  let per_issue: Vec<IssueMetrics> = issues
    .par_iter()
    .map(|issue| {
      let own = by_issue.get(issue.key.as_str()).unwrap_or(&empty);
      process_issue(issue, own, ctx)
    })
    .collect();

  Aggregation { per_issue }
}
