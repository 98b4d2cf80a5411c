//! Computed compliance results — never stored, always derived.
//!
//! Every type here is a plain, JSON-serialisable structure: dates serialise
//! as `YYYY-MM-DD` strings, observed timestamps cross the boundary as the
//! raw text they arrived with. No engine-internal type (resolver tables,
//! classifier strategies) appears in these envelopes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  plan::PlannedAssignment,
  shift::{Route, Shift},
};

// ─── Day-level results ───────────────────────────────────────────────────────

/// A plan satisfied by exactly one claimed visit, enriched with the visit's
/// observed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitedEntry {
  pub plan_id:        Uuid,
  pub site_id:        String,
  pub site_name:      String,
  pub shift:          Shift,
  pub route:          Route,
  pub inspector_name: String,
  /// The claiming visit's timestamp, verbatim from the log.
  pub visited_at:     String,
  pub score:          Option<f64>,
}

/// A plan no visit claimed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissedEntry {
  pub plan_id:          Uuid,
  pub site_id:          String,
  pub site_name:        String,
  pub shift:            Shift,
  pub route:            Route,
  /// More than one shift is planned at this `(site name, route)` on this
  /// date. Display-only disambiguation; never affects matching.
  pub multi_shift_site: bool,
}

/// A visit that satisfied no plan. Visits with no resolvable site identity
/// are dropped before this point and never reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnplannedEntry {
  pub site_id:        String,
  pub site_name:      String,
  pub shift:          Shift,
  pub route:          Option<Route>,
  pub inspector_name: String,
  pub visited_at:     String,
  pub score:          Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
  pub total_planned:   usize,
  pub total_visited:   usize,
  pub total_missed:    usize,
  pub total_unplanned: usize,
  /// `round(100 × visited / planned)`; defined as 0 when nothing was
  /// planned — a day with no plans is "no data", never "100% compliant".
  pub compliance_rate: u32,
}

/// One day's reconciliation of plans against observed visits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayComplianceResult {
  pub date:      NaiveDate,
  pub plans:     Vec<PlannedAssignment>,
  pub visited:   Vec<VisitedEntry>,
  pub missed:    Vec<MissedEntry>,
  pub unplanned: Vec<UnplannedEntry>,
  pub summary:   DaySummary,
}

impl DayComplianceResult {
  /// The all-zero result returned when an upstream read fails. Callers tell
  /// "no plans" apart from "read failure" via [`UpstreamStatus`], never by
  /// inspecting the zero summary alone.
  pub fn empty(date: NaiveDate) -> Self {
    Self {
      date,
      plans: Vec::new(),
      visited: Vec::new(),
      missed: Vec::new(),
      unplanned: Vec::new(),
      summary: DaySummary::default(),
    }
  }
}

// ─── Upstream health ─────────────────────────────────────────────────────────

/// Whether the underlying store reads behind a result actually succeeded.
/// Travels alongside results, never inside their summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamStatus {
  pub plans_ok:  bool,
  pub visits_ok: bool,
}

impl UpstreamStatus {
  pub fn ok() -> Self {
    Self { plans_ok: true, visits_ok: true }
  }

  pub fn is_degraded(&self) -> bool {
    !(self.plans_ok && self.visits_ok)
  }

  pub fn merge(&mut self, other: UpstreamStatus) {
    self.plans_ok &= other.plans_ok;
    self.visits_ok &= other.visits_ok;
  }
}

/// A day result together with its upstream-read health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayComplianceOutcome {
  pub result:   DayComplianceResult,
  pub upstream: UpstreamStatus,
}

// ─── Range aggregates ────────────────────────────────────────────────────────

/// Per-day headline numbers inside a range report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyStat {
  pub date:            NaiveDate,
  pub total_planned:   usize,
  pub total_visited:   usize,
  pub total_missed:    usize,
  pub total_unplanned: usize,
  pub compliance_rate: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTally {
  pub planned: usize,
  pub visited: usize,
  pub missed:  usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorTally {
  /// Visits that claimed a plan.
  pub visited:       usize,
  pub unplanned:     usize,
  /// Distinct `(date, shift)` pairs the inspector reported in.
  pub shifts_worked: usize,
}

/// One row of the most-missed table: a site name and how many of its plans
/// went unvisited across the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedSiteCount {
  pub site_name: String,
  pub count:     usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSummary {
  pub total_planned:   usize,
  pub total_visited:   usize,
  pub total_missed:    usize,
  pub total_unplanned: usize,
  pub compliance_rate: u32,
}

/// Multi-day aggregate: the matcher's per-day output folded into per-shift,
/// per-inspector, and most-missed-site statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeReport {
  pub start_date:        NaiveDate,
  pub end_date:          NaiveDate,
  pub route_filter:      Option<Route>,
  pub daily_stats:       Vec<DailyStat>,
  pub per_shift:         BTreeMap<Shift, ShiftTally>,
  pub per_inspector:     BTreeMap<String, InspectorTally>,
  /// Top 10, sorted by count descending then site name ascending.
  pub most_missed_sites: Vec<MissedSiteCount>,
  pub summary:           RangeSummary,
  pub upstream:          UpstreamStatus,
}

// ─── Inspector route reconstruction ──────────────────────────────────────────

/// How a retained timeline entry was classified by the day matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitOutcome {
  Visited,
  Unplanned,
}

/// One enriched entry of an inspector's reconstructed timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLogEntry {
  pub date:       NaiveDate,
  pub site_id:    String,
  pub site_name:  String,
  pub shift:      Shift,
  pub route:      Option<Route>,
  pub outcome:    VisitOutcome,
  pub visited_at: String,
  // Display-only fields recovered by re-joining against the raw log.
  pub guard_name: String,
  pub gps_text:   String,
  pub score:      Option<f64>,
}

/// A plan missed during the range and attributed to this inspector because
/// its shift is one the inspector empirically worked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissedPlanEntry {
  pub date:      NaiveDate,
  pub site_id:   String,
  pub site_name: String,
  pub shift:     Shift,
  pub route:     Route,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
  pub days:          usize,
  pub visited:       usize,
  pub unplanned:     usize,
  pub missed:        usize,
  /// The shifts this inspector actually reported in, derived from their own
  /// retained entries — not from a declared-shift table.
  pub shifts_worked: Vec<Shift>,
}

/// An inspector's reconstructed patrol timeline over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorRouteReport {
  pub inspector_name: String,
  pub start_date:     NaiveDate,
  pub end_date:       NaiveDate,
  pub logs:           Vec<RouteLogEntry>,
  pub missed_plans:   Vec<MissedPlanEntry>,
  pub summary:        RouteSummary,
  pub upstream:       UpstreamStatus,
}
