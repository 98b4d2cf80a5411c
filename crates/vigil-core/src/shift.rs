//! Shift and route — the two axes that, together with a site and a date,
//! identify a planned patrol visit.
//!
//! Field logs spell both in wildly inconsistent ways (numeric codes, English
//! words, Thai words, codes buried in surrounding text), so the canonical
//! enums here carry their operational codes and name tokens; the heuristics
//! that interpret messy input live in `vigil-engine`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

// ─── Shift ───────────────────────────────────────────────────────────────────

/// One of the three operational shift windows.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Shift {
  Morning,
  Evening,
  Night,
}

impl Shift {
  pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Evening, Shift::Night];

  /// The small-integer code used on paper rosters and in the raw log's
  /// `shift_code` column.
  pub fn code(self) -> u8 {
    match self {
      Shift::Morning => 1,
      Shift::Evening => 2,
      Shift::Night => 3,
    }
  }

  pub fn from_code(code: u8) -> Option<Self> {
    match code {
      1 => Some(Shift::Morning),
      2 => Some(Shift::Evening),
      3 => Some(Shift::Night),
      _ => None,
    }
  }

  /// Lowercase name tokens recognised in free text, in both scripts the
  /// operation logs in (English and Thai).
  pub fn name_tokens(self) -> &'static [&'static str] {
    match self {
      Shift::Morning => &["morning", "เช้า"],
      Shift::Evening => &["evening", "afternoon", "บ่าย", "เย็น"],
      Shift::Night => &["night", "ดึก", "กลางคืน"],
    }
  }

  /// Parse the canonical lowercase name (`"morning"` etc.).
  /// Token and code heuristics for raw log text live in the engine.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .to_ascii_lowercase()
      .parse()
      .map_err(|_| Error::UnknownShift(s.to_owned()))
  }
}

// ─── Route ───────────────────────────────────────────────────────────────────

/// One of the two patrol circuits partitioning the site population.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Route {
  A,
  B,
}

impl Route {
  pub const ALL: [Route; 2] = [Route::A, Route::B];

  /// Parse the canonical route letter, case-insensitively.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownRoute(s.to_owned()))
  }

  /// Lenient parse for raw log text: an exact letter wins; otherwise a
  /// string mentioning exactly one of the two letters (e.g. `"Route B"`)
  /// resolves to that route. Ambiguous or empty text resolves to nothing.
  pub fn from_text(s: &str) -> Option<Self> {
    let trimmed = s.trim();
    if let Ok(route) = trimmed.parse() {
      return Some(route);
    }
    let upper = trimmed.to_ascii_uppercase();
    let has_a = upper.contains('A');
    let has_b = upper.contains('B');
    match (has_a, has_b) {
      (true, false) => Some(Route::A),
      (false, true) => Some(Route::B),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shift_codes_round_trip() {
    for shift in Shift::ALL {
      assert_eq!(Shift::from_code(shift.code()), Some(shift));
    }
    assert_eq!(Shift::from_code(0), None);
    assert_eq!(Shift::from_code(4), None);
  }

  #[test]
  fn shift_parse_canonical_names() {
    assert_eq!(Shift::parse("morning").unwrap(), Shift::Morning);
    assert_eq!(Shift::parse(" Night ").unwrap(), Shift::Night);
    assert!(Shift::parse("graveyard").is_err());
  }

  #[test]
  fn route_from_text_exact_and_embedded() {
    assert_eq!(Route::from_text("A"), Some(Route::A));
    assert_eq!(Route::from_text(" b "), Some(Route::B));
    assert_eq!(Route::from_text("Route B"), Some(Route::B));
    assert_eq!(Route::from_text("สาย A"), Some(Route::A));
  }

  #[test]
  fn route_from_text_ambiguous_is_none() {
    assert_eq!(Route::from_text(""), None);
    assert_eq!(Route::from_text("A/B swing"), None);
  }
}
