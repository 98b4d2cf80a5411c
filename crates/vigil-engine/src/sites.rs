//! Site identity resolution.
//!
//! The field log refers to sites by canonical ID, short code, or display
//! name in either language, with inconsistent case and stray whitespace.
//! [`SiteDirectory`] builds a bidirectional lookup from the site registry so
//! every variant maps to one canonical site ID. A reference that matches
//! nothing is returned unchanged and treated as its own canonical form —
//! resolution never fails.

use std::collections::HashMap;

use vigil_core::registry::SiteRecord;

/// Case- and whitespace-normalised lookup key.
fn alias_key(reference: &str) -> String {
  reference.trim().to_lowercase()
}

/// Bidirectional site lookup built from the registry.
#[derive(Debug, Default)]
pub struct SiteDirectory {
  /// Every known alias (ID, code, each name variant), normalised, to the
  /// canonical site ID.
  aliases: HashMap<String, String>,
  /// Canonical site ID to preferred display name.
  display: HashMap<String, String>,
}

impl SiteDirectory {
  /// A directory that knows no sites; every reference passes through.
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn from_records(records: &[SiteRecord]) -> Self {
    let mut dir = Self::default();
    for record in records {
      let id = record.site_id.trim();
      if id.is_empty() {
        continue;
      }
      for alias in [
        &record.site_id,
        &record.code,
        &record.name_en,
        &record.name_th,
      ] {
        let key = alias_key(alias);
        if !key.is_empty() {
          dir.aliases.entry(key).or_insert_with(|| id.to_owned());
        }
      }
      let name = if record.name_en.trim().is_empty() {
        record.name_th.trim()
      } else {
        record.name_en.trim()
      };
      dir
        .display
        .entry(id.to_owned())
        .or_insert_with(|| name.to_owned());
    }
    dir
  }

  /// Resolve any site reference to its canonical ID. Unknown references
  /// come back trimmed but otherwise unchanged.
  pub fn resolve(&self, reference: &str) -> String {
    let trimmed = reference.trim();
    match self.aliases.get(&alias_key(trimmed)) {
      Some(id) => id.clone(),
      None => trimmed.to_owned(),
    }
  }

  /// Registered display name for a canonical ID, if known.
  pub fn display_name(&self, site_id: &str) -> Option<&str> {
    self.display.get(site_id.trim()).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.display.len()
  }

  pub fn is_empty(&self) -> bool {
    self.display.is_empty()
  }
}

/// Site equality for matching: ID equality when both sides carry an ID,
/// case-insensitive trimmed name equality only when one does not.
pub fn same_site(a_id: &str, a_name: &str, b_id: &str, b_name: &str) -> bool {
  let a_id = a_id.trim();
  let b_id = b_id.trim();
  if !a_id.is_empty() && !b_id.is_empty() {
    return a_id == b_id;
  }
  let a_name = alias_key(a_name);
  let b_name = alias_key(b_name);
  !a_name.is_empty() && a_name == b_name
}
