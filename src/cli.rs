// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Parse command-line flags (with env fallbacks for calendar settings) and normalize them into an EffectiveConfig snapshot
// role: config/cli
// inputs: argv, env (TIMEZONE, BUSINESS_HOURS_START, BUSINESS_HOURS_END, BUSINESS_DAYS)
// outputs: Cli (raw) -> EffectiveConfig (serializable, paths absolute, lists split)
// invariants:
// - normalize performs shape checks only; calendar semantics are validated when the BusinessCalendar is built
// - input "-" means stdin and is never canonicalized
// errors: bail! on empty selections (zero window/cap) with the offending flag named
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Result, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::calendar::{
  CalendarConfig, DEFAULT_BUSINESS_DAYS, DEFAULT_BUSINESS_END, DEFAULT_BUSINESS_START, DEFAULT_TIMEZONE, split_days,
};
use crate::ingest::{InputFormat, IssueFilter};
use crate::report::AggregateBy;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "status-time-report",
    version,
    about = "Time-in-status report (wall clock and business hours) for issue-tracker exports",
    long_about = None
)]
pub struct Cli {
  /// Input JSON document with `issues` (and `events` or changelogs); "-" reads stdin
  #[arg(long, short = 'i', default_value = "-")]
  pub input: String,

  /// Shape of the input records
  #[arg(long, value_enum, default_value_t = InputFormat::Flat)]
  pub input_format: InputFormat,

  /// IANA timezone of the business calendar
  #[arg(long, env = "TIMEZONE", default_value = DEFAULT_TIMEZONE)]
  pub timezone: String,

  /// Start of the business day (HH:MM, local to --timezone)
  #[arg(long, env = "BUSINESS_HOURS_START", default_value = DEFAULT_BUSINESS_START)]
  pub business_start: String,

  /// End of the business day (HH:MM, exclusive)
  #[arg(long, env = "BUSINESS_HOURS_END", default_value = DEFAULT_BUSINESS_END)]
  pub business_end: String,

  /// Comma separated working weekdays, e.g. "Mon,Tue,Wed,Thu,Fri"
  #[arg(long, env = "BUSINESS_DAYS", default_value = DEFAULT_BUSINESS_DAYS)]
  pub business_days: String,

  /// JSON object mapping status names to status categories
  #[arg(long)]
  pub status_catalog: Option<String>,

  /// Keep only issues of this project (repeatable; case-insensitive)
  #[arg(long = "project")]
  pub projects: Vec<String>,

  /// Keep only issues updated within the last N days (relative to --now)
  #[arg(long)]
  pub window_days: Option<u32>,

  /// Cap the number of issues after filtering (input order)
  #[arg(long)]
  pub max_issues: Option<usize>,

  /// status_stats buckets: per status name, or names plus categories
  #[arg(long, value_enum, default_value_t = AggregateBy::Name)]
  pub aggregate_by: AggregateBy,

  /// Evaluation instant for issues still in their current status (RFC3339; default: wall clock)
  #[arg(long, alias = "now-override")]
  pub now: Option<String>,

  /// Worker threads for per-issue computation (0 = one per CPU)
  #[arg(long, default_value_t = 0)]
  pub jobs: usize,

  /// Output location:
  /// - without `--split-apart`: report file path (default stdout "-")
  /// - with `--split-apart`: directory for per-table files (default: auto-named temp dir)
  #[arg(long, short = 'o', default_value = "-")]
  pub out: String,

  /// Write each table to its own file plus manifest.json
  #[arg(long)]
  pub split_apart: bool,

  /// Debug logging on stderr (RUST_LOG takes precedence)
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub input: String, // absolute path, or "-" for stdin
  pub input_format: InputFormat,
  pub calendar: CalendarConfig,
  pub status_catalog: Option<String>,
  pub filter: IssueFilter,
  pub aggregate_by: AggregateBy,
  pub now: Option<String>,
  pub jobs: usize,
  pub out: String,
  pub split_apart: bool,
  pub verbose: bool,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.window_days == Some(0) {
    bail!("--window-days must be at least 1");
  }
  if cli.max_issues == Some(0) {
    bail!("--max-issues must be at least 1");
  }

  let input = if cli.input == "-" { cli.input } else { util::canonicalize_lossy(&cli.input) };
  let projects: Vec<String> = cli
    .projects
    .iter()
    .flat_map(|p| p.split(','))
    .map(|p| p.trim().to_string())
    .filter(|p| !p.is_empty())
    .collect();

  Ok(EffectiveConfig {
    input,
    input_format: cli.input_format,
    calendar: CalendarConfig {
      timezone: cli.timezone.trim().to_string(),
      business_start: cli.business_start.trim().to_string(),
      business_end: cli.business_end.trim().to_string(),
      business_days: split_days(&cli.business_days),
    },
    status_catalog: cli.status_catalog.as_deref().map(util::canonicalize_lossy),
    filter: IssueFilter { projects, window_days: cli.window_days, max_issues: cli.max_issues },
    aggregate_by: cli.aggregate_by,
    now: cli.now,
    jobs: cli.jobs,
    out: cli.out,
    split_apart: cli.split_apart,
    verbose: cli.verbose,
  })
}
