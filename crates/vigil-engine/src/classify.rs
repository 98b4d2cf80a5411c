//! Shift classification.
//!
//! Assigns a visit event to one of the three shift windows. Wall-clock time
//! decides whenever the timestamp is usable; three boundary overlap zones
//! are decided by the inspector's declared home shift with a fixed per-zone
//! fallback. When no time is available, an ordered chain of heuristics over
//! the raw shift code and surrounding text takes over. Classification is
//! total: it never fails, and the terminal default is morning.
//!
//! The per-zone defaults are asymmetric (05:30–06:29 defaults to night,
//! 13:30–14:30 to evening, 21:30–22:30 to night, with the declared-shift
//! override direction differing by zone). This preserves the operational
//! policy literally; confirm with the operators before changing it.

use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};
use vigil_core::{Shift, registry::InspectorRecord};

// ─── Zone boundaries (minutes since midnight) ────────────────────────────────

const MORNING_START: u32 = 6 * 60 + 30; //  06:30
const MORNING_END: u32 = 13 * 60 + 29; //   13:29
const EVENING_START: u32 = 14 * 60 + 31; // 14:31
const EVENING_END: u32 = 21 * 60 + 29; //   21:29
const NIGHT_START: u32 = 22 * 60 + 31; //   22:31
const NIGHT_END: u32 = 5 * 60 + 29; //      05:29

// ─── Diagnostics ─────────────────────────────────────────────────────────────

/// Which rule produced a classification. Diagnostic only — exposed for test
/// assertions and never serialised to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  /// Timestamp fell in a non-overlapping zone.
  WallClock,
  /// Timestamp fell in an overlap zone and the declared home shift decided.
  OverlapDeclared,
  /// Timestamp fell in an overlap zone; the zone's fixed default applied.
  OverlapDefault,
  /// Raw shift code parsed as an exact small-integer code.
  ExactCode,
  /// A code digit was found among surrounding characters.
  EmbeddedCode,
  /// A shift-name token was found in the raw shift code text.
  CodeToken,
  /// A shift-name token was found in the inspector name or context text.
  ContextToken,
  /// The inspector's declared home shift, by roster lookup.
  DeclaredShift,
  /// Nothing resolved; the hard default (morning) terminated the chain.
  Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  pub shift:    Shift,
  pub strategy: Strategy,
}

impl Classification {
  fn new(shift: Shift, strategy: Strategy) -> Self {
    Self { shift, strategy }
  }
}

// ─── Classifier ──────────────────────────────────────────────────────────────

/// The shift classifier, carrying the declared-home-shift roster.
#[derive(Debug, Default)]
pub struct ShiftClassifier {
  declared: HashMap<String, Shift>,
}

impl ShiftClassifier {
  /// A classifier with an empty roster: overlap zones and the last-resort
  /// fallback always take their defaults.
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn from_roster(roster: &[InspectorRecord]) -> Self {
    let declared = roster
      .iter()
      .filter_map(|r| {
        let key = normalize_name(&r.name);
        match (key.is_empty(), r.declared_shift) {
          (false, Some(shift)) => Some((key, shift)),
          _ => None,
        }
      })
      .collect();
    Self { declared }
  }

  /// The declared home shift for an inspector, by case-insensitive trimmed
  /// name lookup.
  pub fn declared_for(&self, inspector_name: &str) -> Option<Shift> {
    self.declared.get(&normalize_name(inspector_name)).copied()
  }

  /// Classify one event. Total: an unresolvable case defaults to morning.
  ///
  /// `context_text` is whatever adjoining raw text the row offers (route
  /// column, free-text remarks); it is only consulted by the token
  /// fallbacks.
  pub fn classify(
    &self,
    time: Option<NaiveTime>,
    shift_code_raw: &str,
    inspector_name: &str,
    context_text: &str,
  ) -> Classification {
    if let Some(t) = time {
      return classify_by_clock(t, self.declared_for(inspector_name));
    }
    self.classify_without_time(shift_code_raw, inspector_name, context_text)
  }

  /// Fallback chain for events with no usable timestamp, tried in order:
  /// exact integer code, embedded code digit, shift-name token in the code
  /// text, token in inspector/context text, declared home shift, morning.
  fn classify_without_time(
    &self,
    shift_code_raw: &str,
    inspector_name: &str,
    context_text: &str,
  ) -> Classification {
    let code_text = shift_code_raw.trim();

    if let Some(shift) =
      code_text.parse::<u8>().ok().and_then(Shift::from_code)
    {
      return Classification::new(shift, Strategy::ExactCode);
    }

    if let Some(shift) = embedded_code(code_text) {
      return Classification::new(shift, Strategy::EmbeddedCode);
    }

    if let Some(shift) = shift_token(code_text) {
      return Classification::new(shift, Strategy::CodeToken);
    }

    if let Some(shift) =
      shift_token(inspector_name).or_else(|| shift_token(context_text))
    {
      return Classification::new(shift, Strategy::ContextToken);
    }

    if let Some(shift) = self.declared_for(inspector_name) {
      return Classification::new(shift, Strategy::DeclaredShift);
    }

    Classification::new(Shift::Morning, Strategy::Default)
  }
}

// ─── Clock zones ─────────────────────────────────────────────────────────────

fn classify_by_clock(
  time: NaiveTime,
  declared: Option<Shift>,
) -> Classification {
  let minute = time.hour() * 60 + time.minute();

  // Non-overlapping zones: wall clock alone decides.
  if (MORNING_START..=MORNING_END).contains(&minute) {
    return Classification::new(Shift::Morning, Strategy::WallClock);
  }
  if (EVENING_START..=EVENING_END).contains(&minute) {
    return Classification::new(Shift::Evening, Strategy::WallClock);
  }
  if minute >= NIGHT_START || minute <= NIGHT_END {
    return Classification::new(Shift::Night, Strategy::WallClock);
  }

  // Overlap zones: declared home shift decides, with the zone's fixed
  // default otherwise. The override direction is deliberately per-zone.
  if minute < MORNING_START {
    // 05:30–06:29 — night ends, morning begins. Night unless declared
    // morning.
    return overlap(declared, Shift::Morning, Shift::Night);
  }
  if minute <= EVENING_START {
    // 13:30–14:30 — morning ends, evening begins. Evening unless declared
    // morning.
    return overlap(declared, Shift::Morning, Shift::Evening);
  }
  // 21:30–22:30 — evening ends, night begins. Night unless declared
  // evening.
  overlap(declared, Shift::Evening, Shift::Night)
}

fn overlap(
  declared: Option<Shift>,
  override_shift: Shift,
  default: Shift,
) -> Classification {
  if declared == Some(override_shift) {
    Classification::new(override_shift, Strategy::OverlapDeclared)
  } else {
    Classification::new(default, Strategy::OverlapDefault)
  }
}

// ─── Text heuristics ─────────────────────────────────────────────────────────

/// A shift code digit buried in surrounding characters, e.g. `"กะ 2"` or
/// `"shift-3"`. First plausible digit wins.
fn embedded_code(text: &str) -> Option<Shift> {
  text
    .chars()
    .filter_map(|c| c.to_digit(10))
    .find_map(|d| u8::try_from(d).ok().and_then(Shift::from_code))
}

/// A shift-name token (either script) somewhere in the text.
fn shift_token(text: &str) -> Option<Shift> {
  let lowered = text.to_lowercase();
  if lowered.trim().is_empty() {
    return None;
  }
  Shift::ALL
    .into_iter()
    .find(|shift| shift.name_tokens().iter().any(|t| lowered.contains(t)))
}

/// Case-insensitive trimmed roster key.
fn normalize_name(name: &str) -> String {
  name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
  }

  fn roster(name: &str, shift: Shift) -> ShiftClassifier {
    ShiftClassifier::from_roster(&[InspectorRecord {
      name:           name.into(),
      declared_shift: Some(shift),
    }])
  }

  // ── Non-overlapping zones ─────────────────────────────────────────────────

  #[test]
  fn plain_zones_by_wall_clock() {
    let c = ShiftClassifier::empty();
    for (h, m, want) in [
      (6u32, 30u32, Shift::Morning),
      (13, 29, Shift::Morning),
      (14, 31, Shift::Evening),
      (21, 29, Shift::Evening),
      (22, 31, Shift::Night),
      (2, 15, Shift::Night),
      (5, 29, Shift::Night),
    ] {
      let got = c.classify(at(h, m), "", "", "");
      assert_eq!(got.shift, want, "{h:02}:{m:02}");
      assert_eq!(got.strategy, Strategy::WallClock);
    }
  }

  // ── Overlap zones ─────────────────────────────────────────────────────────

  #[test]
  fn dawn_overlap_defaults_to_night() {
    let c = ShiftClassifier::empty();
    let got = c.classify(at(5, 45), "", "Somsak", "");
    assert_eq!(got.shift, Shift::Night);
    assert_eq!(got.strategy, Strategy::OverlapDefault);
  }

  #[test]
  fn dawn_overlap_declared_morning_overrides() {
    // Scenario C: Siri declared morning classifies 05:45 as morning; the
    // same timestamp without a declaration (or declared night) is night.
    let c = roster("Siri", Shift::Morning);
    let got = c.classify(at(5, 45), "", "Siri", "");
    assert_eq!(got.shift, Shift::Morning);
    assert_eq!(got.strategy, Strategy::OverlapDeclared);

    let night_declared = roster("Siri", Shift::Night);
    assert_eq!(
      night_declared.classify(at(5, 45), "", "Siri", "").shift,
      Shift::Night
    );
  }

  #[test]
  fn midday_overlap_defaults_to_evening_unless_declared_morning() {
    let c = ShiftClassifier::empty();
    assert_eq!(c.classify(at(13, 30), "", "", "").shift, Shift::Evening);
    assert_eq!(c.classify(at(14, 30), "", "", "").shift, Shift::Evening);

    let morning = roster("Anong", Shift::Morning);
    assert_eq!(
      morning.classify(at(14, 0), "", "Anong", "").shift,
      Shift::Morning
    );
  }

  #[test]
  fn dusk_overlap_defaults_to_night_unless_declared_evening() {
    let c = ShiftClassifier::empty();
    assert_eq!(c.classify(at(21, 30), "", "", "").shift, Shift::Night);
    assert_eq!(c.classify(at(22, 30), "", "", "").shift, Shift::Night);

    let evening = roster("Anong", Shift::Evening);
    assert_eq!(
      evening.classify(at(22, 0), "", "Anong", "").shift,
      Shift::Evening
    );
    // A morning declaration is not the named override for this zone.
    let morning = roster("Anong", Shift::Morning);
    assert_eq!(
      morning.classify(at(22, 0), "", "Anong", "").shift,
      Shift::Night
    );
  }

  // ── Timestamp-less fallback chain ─────────────────────────────────────────

  #[test]
  fn exact_code_wins_first() {
    let c = ShiftClassifier::empty();
    let got = c.classify(None, " 2 ", "", "");
    assert_eq!(got.shift, Shift::Evening);
    assert_eq!(got.strategy, Strategy::ExactCode);
  }

  #[test]
  fn embedded_code_in_noise() {
    let c = ShiftClassifier::empty();
    let got = c.classify(None, "กะ 3", "", "");
    assert_eq!(got.shift, Shift::Night);
    assert_eq!(got.strategy, Strategy::EmbeddedCode);
  }

  #[test]
  fn name_token_in_code_text_both_scripts() {
    let c = ShiftClassifier::empty();
    assert_eq!(
      c.classify(None, "Night shift", "", "").strategy,
      Strategy::CodeToken
    );
    assert_eq!(c.classify(None, "Night shift", "", "").shift, Shift::Night);
    assert_eq!(c.classify(None, "กะเช้า", "", "").shift, Shift::Morning);
  }

  #[test]
  fn token_in_inspector_or_context_text() {
    let c = ShiftClassifier::empty();
    let got = c.classify(None, "??", "Anong (evening)", "");
    assert_eq!(got.shift, Shift::Evening);
    assert_eq!(got.strategy, Strategy::ContextToken);

    let got = c.classify(None, "??", "Anong", "route B ดึก");
    assert_eq!(got.shift, Shift::Night);
    assert_eq!(got.strategy, Strategy::ContextToken);
  }

  #[test]
  fn declared_shift_is_last_resort_before_default() {
    let c = roster("Siri", Shift::Night);
    let got = c.classify(None, "??", "Siri", "");
    assert_eq!(got.shift, Shift::Night);
    assert_eq!(got.strategy, Strategy::DeclaredShift);
  }

  #[test]
  fn unresolvable_defaults_to_morning() {
    let c = ShiftClassifier::empty();
    let got = c.classify(None, "??", "Unknown", "");
    assert_eq!(got.shift, Shift::Morning);
    assert_eq!(got.strategy, Strategy::Default);
  }
}
