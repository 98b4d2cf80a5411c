//! The schema-normalisation adapter.
//!
//! Converts raw visit log rows into typed, classified, date-bucketed
//! [`NormalizedVisit`]s exactly once, at the boundary — the matcher never
//! touches raw text. Parsing is lenient throughout: a malformed timestamp
//! routes the row through the classifier's code/token chain instead of
//! failing, and an unknown site reference passes through as its own
//! identity.

use chrono::{NaiveDate, NaiveDateTime};
use vigil_core::{Route, Shift, visit::RawEventRow};

use crate::{
  classify::{ShiftClassifier, Strategy},
  date_window::resolve_effective_date,
  sites::SiteDirectory,
};

/// A visit event after normalisation. Derived, never stored.
#[derive(Debug, Clone)]
pub struct NormalizedVisit {
  /// Position of the source row in the raw read; final sort tie-break.
  pub raw_index:      usize,
  /// Timestamp text verbatim — this is what crosses the API boundary and
  /// what the reconstructor re-joins on.
  pub timestamp_raw:  String,
  pub timestamp:      Option<NaiveDateTime>,
  pub inspector_name: String,
  pub guard_name:     String,
  /// Canonical site ID, or the trimmed raw reference when unknown.
  pub site_id:        String,
  /// Registered display name, or the trimmed raw reference.
  pub site_name:      String,
  pub route:          Option<Route>,
  pub shift:          Shift,
  pub strategy:       Strategy,
  /// The plan-bucket date. `None` when the row carries no recoverable date
  /// at all; such rows cannot be matched to any day.
  pub effective_date: Option<NaiveDate>,
  pub score:          Option<f64>,
}

/// Accepted timestamp shapes, most common first.
const TIMESTAMP_FORMATS: [&str; 4] = [
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
];

/// Lenient timestamp parse: RFC 3339 (offset discarded — log times are
/// wall-clock local), then the plain formats the field app emits.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return None;
  }
  if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
    return Some(dt.naive_local());
  }
  TIMESTAMP_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Salvage a calendar date from the leading `YYYY-MM-DD` of an otherwise
/// unparseable timestamp.
fn date_prefix(text: &str) -> Option<NaiveDate> {
  let trimmed = text.trim();
  let prefix = trimmed.get(..10)?;
  NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// The adapter itself: borrows the resolver and classifier built from the
/// registries for the duration of one query.
pub struct Normalizer<'a> {
  pub sites:      &'a SiteDirectory,
  pub classifier: &'a ShiftClassifier,
}

impl Normalizer<'_> {
  pub fn normalize(&self, raw_index: usize, row: &RawEventRow) -> NormalizedVisit {
    let timestamp = parse_timestamp(&row.timestamp);

    let classification = self.classifier.classify(
      timestamp.map(|t| t.time()),
      &row.shift_code,
      &row.inspector_name,
      &row.route_text,
    );

    let effective_date = match timestamp {
      Some(ts) => Some(resolve_effective_date(
        ts.date(),
        classification.shift,
        Some(ts.time()),
      )),
      None => date_prefix(&row.timestamp)
        .map(|d| resolve_effective_date(d, classification.shift, None)),
    };

    let site_id = self.sites.resolve(&row.site_name_text);
    let site_name = self
      .sites
      .display_name(&site_id)
      .unwrap_or(row.site_name_text.trim())
      .to_owned();

    NormalizedVisit {
      raw_index,
      timestamp_raw: row.timestamp.clone(),
      timestamp,
      inspector_name: row.inspector_name.trim().to_owned(),
      guard_name: row.guard_name.trim().to_owned(),
      site_id,
      site_name,
      route: Route::from_text(&row.route_text),
      shift: classification.shift,
      strategy: classification.strategy,
      effective_date,
      score: row.score,
    }
  }

  /// Normalise a whole raw read in input order.
  pub fn normalize_all(&self, rows: &[RawEventRow]) -> Vec<NormalizedVisit> {
    rows
      .iter()
      .enumerate()
      .map(|(i, row)| self.normalize(i, row))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use vigil_core::registry::SiteRecord;

  fn fixture() -> (SiteDirectory, ShiftClassifier) {
    let sites = SiteDirectory::from_records(&[SiteRecord {
      site_id: "S-01".into(),
      code:    "GATE1".into(),
      name_en: "North Gate".into(),
      name_th: "ประตูเหนือ".into(),
      route:   Some(Route::A),
    }]);
    (sites, ShiftClassifier::empty())
  }

  fn row(timestamp: &str, site: &str, shift_code: &str) -> RawEventRow {
    RawEventRow {
      timestamp: timestamp.into(),
      inspector_name: "Siri".into(),
      route_text: "A".into(),
      site_name_text: site.into(),
      guard_name: "Somsak".into(),
      shift_code: shift_code.into(),
      score: Some(4.5),
      gps_text: None,
    }
  }

  #[test]
  fn clean_row_is_fully_normalized() {
    let (sites, classifier) = fixture();
    let n = Normalizer { sites: &sites, classifier: &classifier };
    let v = n.normalize(0, &row("2026-02-12 07:00:00", "north gate", "1"));

    assert_eq!(v.site_id, "S-01");
    assert_eq!(v.site_name, "North Gate");
    assert_eq!(v.shift, Shift::Morning);
    assert_eq!(v.route, Some(Route::A));
    assert_eq!(
      v.effective_date,
      NaiveDate::from_ymd_opt(2026, 2, 12)
    );
  }

  #[test]
  fn night_row_after_midnight_buckets_to_previous_day() {
    let (sites, classifier) = fixture();
    let n = Normalizer { sites: &sites, classifier: &classifier };
    let v = n.normalize(0, &row("2026-02-13 02:15:00", "GATE1", "3"));

    assert_eq!(v.shift, Shift::Night);
    assert_eq!(
      v.effective_date,
      NaiveDate::from_ymd_opt(2026, 2, 12)
    );
  }

  #[test]
  fn bad_time_falls_back_to_code_and_date_prefix() {
    let (sites, classifier) = fixture();
    let n = Normalizer { sites: &sites, classifier: &classifier };
    let v = n.normalize(0, &row("2026-02-12 25:99", "North Gate", "2"));

    assert!(v.timestamp.is_none());
    assert_eq!(v.shift, Shift::Evening);
    assert_eq!(v.strategy, Strategy::ExactCode);
    // Date salvaged from the prefix; no time, so no rollback either way.
    assert_eq!(
      v.effective_date,
      NaiveDate::from_ymd_opt(2026, 2, 12)
    );
  }

  #[test]
  fn hopeless_timestamp_yields_no_bucket() {
    let (sites, classifier) = fixture();
    let n = Normalizer { sites: &sites, classifier: &classifier };
    let v = n.normalize(0, &row("yesterday-ish", "North Gate", "1"));
    assert_eq!(v.effective_date, None);
  }

  #[test]
  fn timestamp_formats_accepted() {
    assert!(parse_timestamp("2026-02-12 07:00:00").is_some());
    assert!(parse_timestamp("2026-02-12 07:00").is_some());
    assert!(parse_timestamp("2026-02-12T07:00:00").is_some());
    assert!(parse_timestamp("2026-02-12T07:00:00+07:00").is_some());
    assert!(parse_timestamp("").is_none());
    assert!(parse_timestamp("07:00").is_none());
  }

  #[test]
  fn unknown_site_passes_through() {
    let (sites, classifier) = fixture();
    let n = Normalizer { sites: &sites, classifier: &classifier };
    let v = n.normalize(0, &row("2026-02-12 07:00:00", " Pop-up Post ", "1"));
    assert_eq!(v.site_id, "Pop-up Post");
    assert_eq!(v.site_name, "Pop-up Post");
  }
}
