// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Business-hours arithmetic: overlap between an instant interval and a working calendar in a named timezone
// role: engine/calendar
// inputs: CalendarConfig (IANA zone, HH:MM window, weekday abbreviations); UTC instants
// outputs: Validated BusinessCalendar; business seconds as i64 >= 0
// invariants:
// - business_seconds(start, end) == 0 when end <= start
// - business_seconds(start, end) <= (end - start) in seconds
// - days are stepped on local calendar dates, so DST days count their real length
// errors: Construction rejects unknown zones, malformed HH:MM, end <= start, unknown or empty weekday sets
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_BUSINESS_START: &str = "09:00";
pub const DEFAULT_BUSINESS_END: &str = "17:00";
pub const DEFAULT_BUSINESS_DAYS: &str = "Mon,Tue,Wed,Thu,Fri";

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Raw calendar settings as they arrive from flags, env, or a settings store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
  pub timezone: String,
  pub business_start: String,
  pub business_end: String,
  pub business_days: Vec<String>,
}

impl Default for CalendarConfig {
  fn default() -> Self {
    Self {
      timezone: DEFAULT_TIMEZONE.into(),
      business_start: DEFAULT_BUSINESS_START.into(),
      business_end: DEFAULT_BUSINESS_END.into(),
      business_days: split_days(DEFAULT_BUSINESS_DAYS),
    }
  }
}

/// Split a comma separated weekday list ("Mon,Tue, Wed") into trimmed entries.
pub fn split_days(csv: &str) -> Vec<String> {
  csv.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).map(String::from).collect()
}

/// A validated working calendar. Immutable once built.
#[derive(Clone, Debug)]
pub struct BusinessCalendar {
  tz: Tz,
  day_start: NaiveTime,
  day_end: NaiveTime,
  // indexed by Weekday::num_days_from_monday
  active: [bool; 7],
}

impl BusinessCalendar {
  pub fn new<S: AsRef<str>>(timezone: &str, business_start: &str, business_end: &str, business_days: &[S]) -> Result<Self> {
    let tz: Tz = timezone
      .trim()
      .parse()
      .map_err(|e| anyhow!("unknown timezone {:?}: {}", timezone, e))?;

    let day_start = parse_hhmm(business_start).context("parsing business start")?;
    let day_end = parse_hhmm(business_end).context("parsing business end")?;
    if day_end <= day_start {
      bail!(
        "business window end ({}) must be after start ({})",
        business_end.trim(),
        business_start.trim()
      );
    }

    let mut active = [false; 7];
    for raw in business_days {
      let day = parse_weekday(raw.as_ref())?;
      active[day.num_days_from_monday() as usize] = true;
    }
    if !active.iter().any(|d| *d) {
      bail!("business days must name at least one weekday");
    }

    Ok(Self { tz, day_start, day_end, active })
  }

  pub fn from_config(cfg: &CalendarConfig) -> Result<Self> {
    Self::new(&cfg.timezone, &cfg.business_start, &cfg.business_end, &cfg.business_days)
  }

  pub fn timezone_name(&self) -> &'static str {
    self.tz.name()
  }

  pub fn business_start(&self) -> String {
    self.day_start.format("%H:%M").to_string()
  }

  pub fn business_end(&self) -> String {
    self.day_end.format("%H:%M").to_string()
  }

  /// Active weekdays as canonical abbreviations, Monday first.
  pub fn business_days(&self) -> Vec<String> {
    WEEKDAY_LABELS
      .iter()
      .zip(self.active.iter())
      .filter(|(_, on)| **on)
      .map(|(label, _)| label.to_string())
      .collect()
  }

  pub fn is_business_day(&self, day: Weekday) -> bool {
    self.active[day.num_days_from_monday() as usize]
  }

  /// Seconds of `[start, end)` that fall inside the working window on working days.
  pub fn business_seconds(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    if end <= start {
      return 0;
    }

    let first_day = start.with_timezone(&self.tz).date_naive();
    let last_day = end.with_timezone(&self.tz).date_naive();

    let mut total = 0i64;
    let mut day = first_day;

    while day <= last_day {
      if self.is_business_day(day.weekday()) {
        let window_start = self.resolve_local(day, self.day_start);
        let window_end = self.resolve_local(day, self.day_end);
        let lo = window_start.max(start);
        let hi = window_end.min(end);
        if hi > lo {
          total += (hi - lo).num_seconds();
        }
      }

      day = match day.succ_opt() {
        Some(next) => next,
        None => break,
      };
    }

    total
  }

  /// Map a local wall-clock time on `day` to an instant.
  ///
  /// Ambiguous times (DST fall-back) take the earlier instant. Times skipped by a
  /// spring-forward gap are read with the offset in force before the gap.
  fn resolve_local(&self, day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = day.and_time(time);
    if let Some(dt) = self.tz.from_local_datetime(&naive).earliest() {
      return dt.with_timezone(&Utc);
    }

    let before = naive - Duration::days(1);
    let offset_secs = self
      .tz
      .from_local_datetime(&before)
      .earliest()
      .map(|dt| dt.offset().fix().local_minus_utc())
      .unwrap_or_else(|| self.tz.offset_from_utc_datetime(&naive).fix().local_minus_utc());

    Utc.from_utc_datetime(&(naive - Duration::seconds(offset_secs as i64)))
  }
}

/// Wall-clock seconds between two instants, floored at zero.
pub fn wall_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
  (end - start).num_seconds().max(0)
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime> {
  static RE_HHMM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("static regex"));

  let s = raw.trim();
  let caps = RE_HHMM
    .captures(s)
    .ok_or_else(|| anyhow!("expected HH:MM, got {:?}", raw))?;
  let h: u32 = caps[1].parse().context("parsing hour")?;
  let m: u32 = caps[2].parse().context("parsing minute")?;

  NaiveTime::from_hms_opt(h, m, 0).ok_or_else(|| anyhow!("time out of range: {:?}", raw))
}

fn parse_weekday(raw: &str) -> Result<Weekday> {
  let s = raw.trim().to_ascii_lowercase();
  let prefix: String = s.chars().take(3).collect();
  let day = match prefix.as_str() {
    "mon" => Weekday::Mon,
    "tue" => Weekday::Tue,
    "wed" => Weekday::Wed,
    "thu" => Weekday::Thu,
    "fri" => Weekday::Fri,
    "sat" => Weekday::Sat,
    "sun" => Weekday::Sun,
    _ => bail!("unknown weekday {:?} (expected Mon..Sun)", raw),
  };
  Ok(day)
}
