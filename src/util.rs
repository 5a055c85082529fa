// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for tracker timestamps, UTC formatting, the evaluation instant, output directories and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Parsed/ formatted timestamps, directories ensured, man page text
// side_effects: prepare_out_dir creates directories
// invariants:
// - parse_tracker_ts never fails loudly; unknown shapes yield None
// - iso_utc output is second-precision RFC3339 with a trailing Z
// - prepare_out_dir returns an existing directory (either provided or temp timestamped)
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp as issue trackers emit them.
///
/// Accepts RFC3339, offsets without a colon (`2024-10-02T14:05:16.123-0400`)
/// and naive date-times, which are taken as UTC.
pub fn parse_tracker_ts(raw: &str) -> Option<DateTime<Utc>> {
  let s = raw.trim();
  if s.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
    return Some(dt.with_timezone(&Utc));
  }
  NAIVE_FORMATS
    .iter()
    .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    .map(|n| n.and_utc())
}

/// Formats an instant as RFC3339 in UTC, whole seconds.
pub fn iso_utc(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse the `--now` override (RFC3339 or any tracker timestamp shape).
pub fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
  parse_tracker_ts(raw).with_context(|| format!("invalid --now timestamp: {:?}", raw))
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current time is read once.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Prepare an output directory for split-apart runs.
///
/// - When `out` is not "-", it is treated as the target directory; it will be created if needed.
/// - When `out` is "-", a temp directory is created with a timestamped name.
///   Returns the absolute path as a String.
pub fn prepare_out_dir(out: &str, now_opt: Option<DateTime<Utc>>) -> Result<String> {
  let dir = if out != "-" {
    out.to_string()
  } else {
    let eff_now = effective_now(now_opt);
    std::env::temp_dir()
      .join(format!("status-time-{}", eff_now.format("%Y%m%d-%H%M%S")))
      .to_string_lossy()
      .to_string()
  };
  std::fs::create_dir_all(&dir).with_context(|| format!("creating output directory {}", dir))?;

  Ok(canonicalize_lossy(&dir))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
