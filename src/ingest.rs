// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Decode an input document (flat records or raw tracker REST payloads) into Issues and TransitionEvents, then apply selection filters
// role: ingest/decode
// inputs: JSON document {issues: [...], events?: [...], changelogs?: {KEY: [history...]}} from a file or stdin ("-")
// outputs: Batch { issues, events (record order), dropped_events }; filtered issue list
// side_effects: Reads the input file/stdin
// invariants:
// - event record order is preserved (flat: array order; jira: history order, then item order)
// - events whose timestamp cannot be parsed are kept with at = None and counted in dropped_events
// - blank optional strings decode as None
// errors: IO and JSON shape errors carry the input path and record index in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;
use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ext::serde_json::JsonFetch;
use crate::model::{Issue, TransitionEvent};
use crate::util::parse_tracker_ts;

/// Tracker field holding the epic link on classic projects.
pub const EPIC_LINK_FIELD: &str = "customfield_10014";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
  /// Records shaped like the report's own issue/event model
  #[default]
  Flat,
  /// Raw issue-tracker REST payloads with changelog histories
  Jira,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
  pub issues: Vec<Issue>,
  pub events: Vec<TransitionEvent>,
  /// Events kept without a timestamp because theirs could not be parsed.
  pub dropped_events: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlatIssue {
  key: String,
  project_key: Option<String>,
  issue_type: Option<String>,
  summary: Option<String>,
  status: Option<String>,
  created: Option<String>,
  updated: Option<String>,
  parent_key: Option<String>,
  epic_key: Option<String>,
  labels: Option<Vec<Value>>,
}

fn blank_to_none(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn project_from_key(key: &str) -> String {
  key.split_once('-').map(|(p, _)| p.to_string()).unwrap_or_default()
}

/// Read a JSON document from `path`, or from stdin when `path` is "-".
pub fn read_document(path: &str) -> Result<Value> {
  let mut raw = String::new();
  if path == "-" {
    std::io::stdin().read_to_string(&mut raw).context("reading input from stdin")?;
  } else {
    raw = std::fs::read_to_string(path).with_context(|| format!("reading input {}", path))?;
  }
  serde_json::from_str(&raw).with_context(|| format!("parsing input {} as JSON", path))
}

pub fn load_batch(path: &str, format: InputFormat) -> Result<Batch> {
  let doc = read_document(path)?;
  decode(&doc, format).with_context(|| format!("decoding input {}", path))
}

pub fn decode(doc: &Value, format: InputFormat) -> Result<Batch> {
  if !doc.is_object() {
    bail!("input must be a JSON object with an \"issues\" array");
  }
  let issues: &[Value] = match doc.get("issues") {
    Some(Value::Array(items)) => items.as_slice(),
    Some(_) => bail!("\"issues\" must be an array"),
    None => &[],
  };
  match format {
    InputFormat::Flat => decode_flat(issues, doc.fetch("events").value()),
    InputFormat::Jira => decode_jira(issues, doc.fetch("changelogs").value()),
  }
}

fn decode_flat(issues: &[Value], events: Option<&Value>) -> Result<Batch> {
  let mut batch = Batch::default();

  for (idx, raw) in issues.iter().enumerate() {
    let rec = FlatIssue::deserialize(raw).with_context(|| format!("issues[{}]", idx))?;
    if rec.key.trim().is_empty() {
      bail!("issues[{}]: missing issue key", idx);
    }
    let key = rec.key.trim().to_string();
    batch.issues.push(Issue {
      project_key: blank_to_none(rec.project_key).unwrap_or_else(|| project_from_key(&key)),
      issue_type: rec.issue_type.unwrap_or_default(),
      summary: rec.summary.unwrap_or_default(),
      status: blank_to_none(rec.status).unwrap_or_default(),
      created: rec.created.as_deref().and_then(parse_tracker_ts),
      updated: rec.updated.as_deref().and_then(parse_tracker_ts),
      parent_key: blank_to_none(rec.parent_key),
      epic_key: blank_to_none(rec.epic_key),
      labels: rec
        .labels
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>(),
      key,
    });
  }

  let events: &[Value] = match events {
    Some(Value::Array(items)) => items.as_slice(),
    Some(_) => bail!("\"events\" must be an array"),
    None => &[],
  };
  // malformed fields drop the event, never the batch
  for raw in events {
    let at = raw.fetch("at").text().as_deref().and_then(parse_tracker_ts);
    if at.is_none() {
      batch.dropped_events += 1;
    }
    batch.events.push(TransitionEvent {
      issue_key: raw.fetch("issue_key").text().unwrap_or_default(),
      at,
      from_status: raw.fetch("from_status").text(),
      to_status: raw.fetch("to_status").text().unwrap_or_default(),
    });
  }

  Ok(batch)
}

fn decode_jira(issues: &[Value], changelogs: Option<&Value>) -> Result<Batch> {
  let mut batch = Batch::default();

  for (idx, raw) in issues.iter().enumerate() {
    let Some(key) = raw.fetch("key").text() else {
      bail!("issues[{}]: missing issue key", idx);
    };
    let f = raw.fetch("fields");
    let fields = f.value();
    let field = |path: &str| fields.and_then(|v| v.fetch(path).text());

    let epic_key = field(EPIC_LINK_FIELD).or_else(|| field("epic.key"));
    batch.issues.push(Issue {
      project_key: field("project.key").unwrap_or_else(|| project_from_key(&key)),
      issue_type: field("issuetype.name").unwrap_or_default(),
      summary: field("summary").unwrap_or_default(),
      status: field("status.name").unwrap_or_default(),
      created: field("created").as_deref().and_then(parse_tracker_ts),
      updated: field("updated").as_deref().and_then(parse_tracker_ts),
      parent_key: field("parent.key"),
      epic_key,
      labels: fields.map(|v| v.fetch("labels").strings()).unwrap_or_default().into_iter().collect(),
      key: key.clone(),
    });

    let inline = raw.fetch("changelog.histories").value();
    let external = changelogs.and_then(|m| m.get(key.as_str()));
    for histories in [inline, external].into_iter().flatten() {
      push_histories(&mut batch, &key, histories);
    }
  }

  Ok(batch)
}

/// Append the status changes of one changelog (array of histories, or an object with "histories").
fn push_histories(batch: &mut Batch, issue_key: &str, histories: &Value) {
  let list: &[Value] = match histories {
    Value::Array(items) => items.as_slice(),
    other => match other.get("histories") {
      Some(Value::Array(items)) => items.as_slice(),
      _ => &[],
    },
  };
  for h in list {
    let at: Option<DateTime<Utc>> = h.fetch("created").text().as_deref().and_then(parse_tracker_ts);
    let items: &[Value] = match h.get("items") {
      Some(Value::Array(items)) => items.as_slice(),
      _ => &[],
    };
    for item in items {
      let is_status = item.fetch("field").text().is_some_and(|f| f.eq_ignore_ascii_case("status"));
      if !is_status {
        continue;
      }
      if at.is_none() {
        batch.dropped_events += 1;
      }
      batch.events.push(TransitionEvent {
        issue_key: issue_key.to_string(),
        at,
        from_status: item.fetch("fromString").text(),
        to_status: item.fetch("toString").text().unwrap_or_default(),
      });
    }
  }
}

/// Issue selection applied before any computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilter {
  /// Project keys to keep (case-insensitive); empty keeps all.
  pub projects: Vec<String>,
  /// Keep issues updated within this many days before `now`.
  pub window_days: Option<u32>,
  /// Cap on the number of issues after the other filters.
  pub max_issues: Option<usize>,
}

impl IssueFilter {
  pub fn matches(&self, issue: &Issue, now: DateTime<Utc>) -> bool {
    if !self.projects.is_empty() && !self.projects.iter().any(|p| p.eq_ignore_ascii_case(&issue.project_key)) {
      return false;
    }
    match self.window_days {
      // a window reaching past the representable range has no lower bound
      Some(days) => match now.checked_sub_signed(Duration::days(i64::from(days))) {
        Some(since) => issue.updated.is_some_and(|u| u >= since),
        None => issue.updated.is_some(),
      },
      None => true,
    }
  }
}

/// Apply `filter`, keeping input order.
pub fn select_issues(issues: Vec<Issue>, filter: &IssueFilter, now: DateTime<Utc>) -> Vec<Issue> {
  let kept = issues.into_iter().filter(|i| filter.matches(i, now));
  match filter.max_issues {
    Some(n) => kept.take(n).collect(),
    None => kept.collect(),
  }
}
