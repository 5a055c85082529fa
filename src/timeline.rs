// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reconstruct one issue's gap-free status timeline from its creation time, last update and status-change events
// role: engine/timeline
// inputs: &Issue, any iterator of &TransitionEvent (other issues' events are ignored), evaluation instant
// outputs: Timeline { segments (ordered, contiguous), dropped (degenerate segments discarded) }
// invariants:
// - segments[i].exited_at == segments[i + 1].entered_at whenever both came from the event chain
// - every segment has a non-empty status and exited_at > entered_at
// - events sharing an instant keep their input order (stable sort)
// errors: None; malformed history is dropped segment by segment, never raised
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};

use crate::model::{Issue, TimelineSegment, TransitionEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
  pub segments: Vec<TimelineSegment>,
  /// Candidate segments discarded for an empty status or a non-positive length.
  pub dropped: usize,
}

impl Timeline {
  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }
}

struct Candidate<'a> {
  status: &'a str,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  open: bool,
}

/// Build the status timeline for `issue`.
///
/// The tail segment runs to `issue.updated` when known, otherwise to `now`.
pub fn build_timeline<'a, I>(issue: &Issue, events: I, now: DateTime<Utc>) -> Timeline
where
  I: IntoIterator<Item = &'a TransitionEvent>,
{
  let mut changes: Vec<(DateTime<Utc>, &TransitionEvent)> = events
    .into_iter()
    .filter(|e| e.issue_key == issue.key)
    .filter_map(|e| e.at.map(|at| (at, e)))
    .collect();
  // slice::sort_by_key is stable: same-instant events keep record order
  changes.sort_by_key(|(at, _)| *at);

  let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(changes.len() + 1);

  if changes.is_empty() {
    if let (Some(created), Some(updated)) = (issue.created, issue.updated) {
      if !issue.status.is_empty() {
        candidates.push(Candidate { status: &issue.status, start: created, end: updated, open: false });
      }
    }
    return finish(candidates);
  }

  // Phase 1: time before the first recorded change, in the status it left
  let (first_at, first) = changes[0];
  if let (Some(created), Some(from)) = (issue.created, first.from_status.as_deref()) {
    if !from.is_empty() {
      candidates.push(Candidate { status: from, start: created, end: first_at, open: false });
    }
  }

  // Phase 2: each entered status lasts until the next change
  for pair in changes.windows(2) {
    let (at, event) = pair[0];
    let (next_at, _) = pair[1];
    candidates.push(Candidate { status: &event.to_status, start: at, end: next_at, open: false });
  }

  // Phase 3: tail, closed by the last update or the evaluation instant
  let (last_at, last) = changes[changes.len() - 1];
  let (tail_end, open) = match issue.updated {
    Some(updated) => (updated, false),
    None => (now, true),
  };
  candidates.push(Candidate { status: &last.to_status, start: last_at, end: tail_end, open });

  finish(candidates)
}

fn finish(candidates: Vec<Candidate<'_>>) -> Timeline {
  let mut timeline = Timeline::default();
  for c in candidates {
    if c.status.is_empty() || c.end <= c.start {
      timeline.dropped += 1;
      continue;
    }
    timeline.segments.push(TimelineSegment {
      status: c.status.to_string(),
      entered_at: c.start,
      exited_at: c.end,
      open: c.open,
    });
  }
  timeline
}
