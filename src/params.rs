// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn an EffectiveConfig into validated run parameters (calendar, catalog, now, worker count)
// role: config/params
// inputs: &EffectiveConfig
// outputs: RunParams
// invariants: A RunParams always holds a valid BusinessCalendar; no run starts with an invalid calendar
// errors: Calendar validation, catalog loading and --now parsing errors, each with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calendar::BusinessCalendar;
use crate::catalog::StatusCatalog;
use crate::cli::EffectiveConfig;
use crate::ingest::IssueFilter;
use crate::report::AggregateBy;
use crate::util;

#[derive(Debug, Clone)]
pub struct RunParams {
  pub calendar: BusinessCalendar,
  pub catalog: StatusCatalog,
  pub filter: IssueFilter,
  pub aggregate_by: AggregateBy,
  pub now: DateTime<Utc>,
  pub jobs: usize,
}

pub fn build_run_params(cfg: &EffectiveConfig) -> Result<RunParams> {
  let calendar = BusinessCalendar::from_config(&cfg.calendar).context("invalid business calendar")?;
  let catalog = match cfg.status_catalog.as_deref() {
    Some(path) => {
      let catalog = StatusCatalog::load(std::path::Path::new(path))?;
      debug!(file = path, statuses = catalog.len(), "status catalog loaded");
      catalog
    }
    None => StatusCatalog::default(),
  };
  let now_override = cfg.now.as_deref().map(util::parse_now).transpose()?;

  Ok(RunParams {
    calendar,
    catalog,
    filter: cfg.filter.clone(),
    aggregate_by: cfg.aggregate_by,
    now: util::effective_now(now_override),
    jobs: cfg.jobs,
  })
}
