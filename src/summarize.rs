// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Measure timeline segments (wall + business seconds) and fold them into per-status totals
// role: engine/summarize
// inputs: TimelineSegment slices, BusinessCalendar, StatusCatalog
// outputs: StatusInterval rows (indexed per issue) and StatusSummaries keyed by status name
// invariants:
// - every interval bumps entered_count by one, whatever its length (re-entries are counted again)
// - empty timeline => empty summaries
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::calendar::{BusinessCalendar, wall_seconds};
use crate::catalog::StatusCatalog;
use crate::model::{StatusInterval, StatusSummaries, TimelineSegment};

/// Attach durations, category and a per-issue index to each segment.
pub fn measure(
  issue_key: &str,
  segments: &[TimelineSegment],
  calendar: &BusinessCalendar,
  catalog: &StatusCatalog,
) -> Vec<StatusInterval> {
  segments
    .iter()
    .enumerate()
    .map(|(idx, seg)| StatusInterval {
      issue_key: issue_key.to_string(),
      status_name: seg.status.clone(),
      status_category: catalog.category(&seg.status).to_string(),
      entered_at: seg.entered_at,
      exited_at: seg.exited_at,
      open: seg.open,
      duration_seconds_wall: wall_seconds(seg.entered_at, seg.exited_at),
      duration_seconds_business: calendar.business_seconds(seg.entered_at, seg.exited_at),
      interval_index: idx,
    })
    .collect()
}

pub fn summarize_intervals(intervals: &[StatusInterval]) -> StatusSummaries {
  let mut out = StatusSummaries::new();
  for iv in intervals {
    out.entry(iv.status_name.clone()).or_default().record(iv);
  }
  out
}

/// Per-status totals for one timeline.
pub fn summarize(segments: &[TimelineSegment], calendar: &BusinessCalendar) -> StatusSummaries {
  summarize_intervals(&measure("", segments, calendar, &StatusCatalog::default()))
}
