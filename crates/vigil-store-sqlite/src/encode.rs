//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339 strings. Shifts
//! and routes are stored as their canonical lowercase / uppercase names.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use vigil_core::{
  Route, Shift,
  plan::PlannedAssignment,
  registry::{InspectorRecord, SiteRecord},
  visit::RawEventRow,
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates and timestamps ────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Shift and Route ─────────────────────────────────────────────────────────

pub fn encode_shift(s: Shift) -> String { s.to_string() }

pub fn decode_shift(s: &str) -> Result<Shift> { Ok(Shift::parse(s)?) }

pub fn encode_route(r: Route) -> String { r.to_string() }

pub fn decode_route(s: &str) -> Result<Route> { Ok(Route::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `plans` row.
pub struct RawPlanRow {
  pub plan_id:    String,
  pub date:       String,
  pub shift:      String,
  pub route:      String,
  pub site_id:    String,
  pub site_name:  String,
  pub created_by: String,
  pub created_at: String,
}

impl RawPlanRow {
  pub fn into_plan(self) -> Result<PlannedAssignment> {
    Ok(PlannedAssignment {
      plan_id:    decode_uuid(&self.plan_id)?,
      date:       decode_date(&self.date)?,
      shift:      decode_shift(&self.shift)?,
      route:      decode_route(&self.route)?,
      site_id:    self.site_id,
      site_name:  self.site_name,
      created_by: self.created_by,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `visit_log` row. Every column is already the text the field app wrote,
/// so this maps straight onto [`RawEventRow`] with no decoding to fail.
pub struct RawVisitRow {
  pub timestamp:      String,
  pub inspector_name: String,
  pub route_text:     String,
  pub site_name_text: String,
  pub guard_name:     String,
  pub shift_code:     String,
  pub score:          Option<f64>,
  pub gps_text:       Option<String>,
}

impl RawVisitRow {
  pub fn into_event(self) -> RawEventRow {
    RawEventRow {
      timestamp:      self.timestamp,
      inspector_name: self.inspector_name,
      route_text:     self.route_text,
      site_name_text: self.site_name_text,
      guard_name:     self.guard_name,
      shift_code:     self.shift_code,
      score:          self.score,
      gps_text:       self.gps_text,
    }
  }
}

/// Raw strings read directly from a `sites` row.
pub struct RawSiteRow {
  pub site_id: String,
  pub code:    String,
  pub name_en: String,
  pub name_th: String,
  pub route:   Option<String>,
}

impl RawSiteRow {
  pub fn into_site(self) -> Result<SiteRecord> {
    Ok(SiteRecord {
      site_id: self.site_id,
      code:    self.code,
      name_en: self.name_en,
      name_th: self.name_th,
      route:   self.route.as_deref().map(decode_route).transpose()?,
    })
  }
}

/// Raw strings read directly from an `inspectors` row. An unparseable
/// declared shift degrades to no declaration rather than failing the read.
pub struct RawInspectorRow {
  pub name:           String,
  pub declared_shift: Option<String>,
}

impl RawInspectorRow {
  pub fn into_inspector(self) -> InspectorRecord {
    InspectorRecord {
      name:           self.name,
      declared_shift: self
        .declared_shift
        .as_deref()
        .and_then(|s| Shift::parse(s).ok()),
    }
  }
}
