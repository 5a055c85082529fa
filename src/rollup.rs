// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold per-issue status totals upward into parent-level and epic-level buckets
// role: engine/rollup
// inputs: &[Issue] and the matching per-issue metrics (matched by issue key)
// outputs: (parent buckets, epic buckets), each in first-seen key order
// invariants:
// - bucket.wall_seconds == sum of wall_seconds over every status of every contributing issue
// - child_issue_count counts distinct issue keys; a duplicated issue record is folded in only once
// - parent and epic levels are independent namespaces; an issue may feed both
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{HashMap, HashSet};

use crate::aggregate::IssueMetrics;
use crate::model::{Issue, RollupBucket, RollupLevel, StatusSummary};

/// Insertion-ordered bucket table for one rollup level.
struct Level {
  level: RollupLevel,
  order: Vec<String>,
  buckets: HashMap<String, (RollupBucket, HashSet<String>)>,
}

impl Level {
  fn new(level: RollupLevel) -> Self {
    Self { level, order: Vec::new(), buckets: HashMap::new() }
  }

  fn add(&mut self, key: &str, issue: &Issue, total: &StatusSummary) {
    if !self.buckets.contains_key(key) {
      self.order.push(key.to_string());
      let bucket = RollupBucket {
        entity_key: key.to_string(),
        level: self.level,
        child_issue_count: 0,
        wall_seconds: 0,
        business_seconds: 0,
        entered_count: 0,
        epic_key: None,
      };
      self.buckets.insert(key.to_string(), (bucket, HashSet::new()));
    }
    let Some((bucket, children)) = self.buckets.get_mut(key) else { return };
    if !children.insert(issue.key.clone()) {
      return;
    }
    bucket.child_issue_count = children.len();
    bucket.wall_seconds += total.wall_seconds;
    bucket.business_seconds += total.business_seconds;
    bucket.entered_count += total.entered_count;
    if self.level == RollupLevel::Parent {
      bucket.epic_key = non_empty(issue.epic_key.as_deref()).map(String::from);
    }
  }

  fn into_buckets(mut self) -> Vec<RollupBucket> {
    self.order.iter().filter_map(|k| self.buckets.remove(k).map(|(b, _)| b)).collect()
  }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
  v.map(str::trim).filter(|s| !s.is_empty())
}

/// Roll per-issue totals into parent and epic buckets.
///
/// Issues without metrics (not present in `metrics`) contribute zero totals
/// but are still counted as children.
pub fn rollup(issues: &[Issue], metrics: &[IssueMetrics]) -> (Vec<RollupBucket>, Vec<RollupBucket>) {
  let totals: HashMap<&str, StatusSummary> = metrics.iter().map(|m| (m.issue_key.as_str(), m.total())).collect();

  let mut parents = Level::new(RollupLevel::Parent);
  let mut epics = Level::new(RollupLevel::Epic);

  for issue in issues {
    let total = totals.get(issue.key.as_str()).copied().unwrap_or_default();
    if let Some(parent) = non_empty(issue.parent_key.as_deref()) {
      parents.add(parent, issue, &total);
    }
    if let Some(epic) = non_empty(issue.epic_key.as_deref()) {
      epics.add(epic, issue, &total);
    }
  }

  (parents.into_buckets(), epics.into_buckets())
}
