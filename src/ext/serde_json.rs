// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookups into raw tracker payloads (serde_json::Value) with lenient typed extraction
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (typed, text, string-list accessors)
// invariants: No panics; missing paths and JSON null yield None; text() never returns an empty string
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A located (or missing) node inside a JSON document.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn value(&self) -> Option<&'a Value> {
    self.inner.filter(|v| !v.is_null())
  }

  /// Attempt to deserialize the fetched value as `T`.
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.value().and_then(|v| T::deserialize(v).ok())
  }

  /// Deserialize as `T`, returning `T::default()` on failure.
  pub fn to_or_default<T>(&self) -> T
  where
    T: DeserializeOwned + Default,
  {
    self.to::<T>().unwrap_or_default()
  }

  /// Trimmed, non-empty string content. Numbers are rendered as text (tracker ids are often numeric).
  pub fn text(&self) -> Option<String> {
    let s = match self.value()? {
      Value::String(s) => s.trim().to_string(),
      Value::Number(n) => n.to_string(),
      _ => return None,
    };
    if s.is_empty() { None } else { Some(s) }
  }

  /// String items of an array; non-string items are skipped.
  pub fn strings(&self) -> Vec<String> {
    match self.value() {
      Some(Value::Array(items)) => items
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect(),
      _ => Vec::new(),
    }
  }
}

/// Extension to fetch nested values via dotted paths like "fields.status.name".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
