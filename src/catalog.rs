// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Immutable status-name -> status-category mapping supplied with the run configuration
// role: config/catalog
// inputs: JSON object file {"In Progress": "In Progress", "Done": "Done", ...} or an in-memory map
// outputs: StatusCatalog with infallible lookups (empty category when unknown)
// invariants: Lookups never fail; names match exactly (tracker names are case-sensitive)
// errors: Only loading can fail (IO / JSON shape), with the file path in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCatalog {
  categories: BTreeMap<String, String>,
}

impl StatusCatalog {
  pub fn new(categories: BTreeMap<String, String>) -> Self {
    Self { categories }
  }

  pub fn load(path: &Path) -> Result<Self> {
    let data = std::fs::read(path).with_context(|| format!("reading status catalog {}", path.display()))?;
    let categories: BTreeMap<String, String> =
      serde_json::from_slice(&data).with_context(|| format!("parsing status catalog {}", path.display()))?;
    Ok(Self::new(categories))
  }

  /// Category for a status name, or "" when the catalog does not know it.
  pub fn category(&self, status: &str) -> &str {
    self.categories.get(status).map(String::as_str).unwrap_or("")
  }

  pub fn len(&self) -> usize {
    self.categories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.categories.is_empty()
  }
}

impl FromIterator<(String, String)> for StatusCatalog {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self::new(iter.into_iter().collect())
  }
}
